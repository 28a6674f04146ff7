//! The descriptor layout as data: where every populated field sits in the
//! record and what produces its bytes.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
  Verbatim,
  Reversed,
}

impl Transform {
  pub fn apply(self, bytes: &mut [u8]) {
    match self {
      Transform::Verbatim => {}
      Transform::Reversed => bytes.reverse(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
  /// Copied from an absolute offset in the source image.
  Copy { from: u64, transform: Transform },
  /// The same byte repeated across the field.
  Repeat(u8),
  /// A big-endian constant.
  U16(u16),
  /// Total source length, truncated to 32 bits and stored big-endian.
  ContentSize,
  /// 160 bit hash over the whole source.
  ContentDigest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
  pub name: &'static str,
  pub offset: usize,
  pub len: usize,
  pub value: FieldValue,
}

impl Field {
  pub const fn range(&self) -> Range<usize> {
    self.offset..self.offset + self.len
  }
}

pub const TITLE_ID_HIGH: Field = Field {
  name: "title id (high)",
  offset: 0x18C,
  len: 4,
  value: FieldValue::Copy {
    from: 0x234,
    transform: Transform::Reversed,
  },
};

pub const TITLE_ID_LOW: Field = Field {
  name: "title id (low)",
  offset: 0x190,
  len: 4,
  value: FieldValue::Copy {
    from: 0x0C,
    transform: Transform::Verbatim,
  },
};

pub const GROUP_ID: Field = Field {
  name: "group id",
  offset: 0x198,
  len: 2,
  value: FieldValue::Copy {
    from: 0x10,
    transform: Transform::Verbatim,
  },
};

pub const AGE_RATINGS: Field = Field {
  name: "age ratings",
  offset: 0x1AA,
  len: 0x10,
  value: FieldValue::Repeat(0x80),
};

pub const CONTENT_COUNT: Field = Field {
  name: "content count",
  offset: 0x1DE,
  len: 2,
  value: FieldValue::U16(1),
};

pub const CONTENT_TYPE: Field = Field {
  name: "content type",
  offset: 0x1EA,
  len: 2,
  value: FieldValue::U16(1),
};

pub const CONTENT_SIZE: Field = Field {
  name: "content size",
  offset: 0x1F0,
  len: 4,
  value: FieldValue::ContentSize,
};

pub const CONTENT_DIGEST: Field = Field {
  name: "content digest",
  offset: 0x1F4,
  len: 20,
  value: FieldValue::ContentDigest,
};

pub const FIELDS: [Field; 8] = [
  TITLE_ID_HIGH,
  TITLE_ID_LOW,
  GROUP_ID,
  AGE_RATINGS,
  CONTENT_COUNT,
  CONTENT_TYPE,
  CONTENT_SIZE,
  CONTENT_DIGEST,
];

/// Smallest source image every copied field can be read from.
pub const fn minimum_source_len() -> u64 {
  let mut minimum = 0;
  let mut index = 0;
  while index < FIELDS.len() {
    if let FieldValue::Copy { from, .. } = FIELDS[index].value {
      let end = from + FIELDS[index].len as u64;
      if end > minimum {
        minimum = end;
      }
    }
    index += 1;
  }
  minimum
}
