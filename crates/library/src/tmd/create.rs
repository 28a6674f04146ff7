use std::{
  backtrace::Backtrace,
  io::{self, Read, Seek, SeekFrom},
  marker::PhantomData,
};

use log::debug;
use sha1::{Digest, Sha1, digest::consts::U20};
use snafu::{ResultExt, Snafu};
use zerocopy::{FromZeros, IntoBytes};

use crate::tmd::{
  fields::{
    AGE_RATINGS, CONTENT_COUNT, CONTENT_DIGEST, CONTENT_SIZE, CONTENT_TYPE, FIELDS, Field,
    FieldValue, GROUP_ID, TITLE_ID_HIGH, TITLE_ID_LOW,
  },
  types::TitleMetadata,
};

/// The source is hashed in reads of this size.
pub const DIGEST_CHUNK_SIZE: usize = 0x200;

#[derive(Snafu, Debug)]
pub enum CreateError {
  #[snafu(display(
    "failed to read {len} bytes of {field} from source offset 0x{offset:X}: {source}"
  ))]
  ReadField {
    field: &'static str,
    offset: u64,
    len: usize,
    source: io::Error,
    backtrace: Backtrace,
  },
  #[snafu(display("failed to measure the source length: {source}"))]
  MeasureSource {
    source: io::Error,
    backtrace: Backtrace,
  },
  #[snafu(display("error while hashing the source: {source}"))]
  HashSource {
    source: io::Error,
    backtrace: Backtrace,
  },
}

/// Fills a zeroed [`TitleMetadata`] field by field from a source image.
///
/// Every step seeks from an absolute anchor, so steps can run in any order
/// and the source position on entry does not matter.
pub struct TmdBuilder<'a, R, D = Sha1> {
  source: &'a mut R,
  record: TitleMetadata,
  phantom: PhantomData<D>,
}

impl<'a, R, D> TmdBuilder<'a, R, D>
where
  R: Read + Seek,
  D: Digest<OutputSize = U20>,
{
  pub fn new(source: &'a mut R) -> Self {
    Self {
      source,
      record: TitleMetadata::new_zeroed(),
      phantom: PhantomData,
    }
  }

  pub fn extract_identifier_part_a(&mut self) -> Result<&mut Self, CreateError> {
    self.apply(&TITLE_ID_HIGH)
  }

  pub fn extract_identifier_part_b(&mut self) -> Result<&mut Self, CreateError> {
    self.apply(&TITLE_ID_LOW)
  }

  pub fn extract_group_tag(&mut self) -> Result<&mut Self, CreateError> {
    self.apply(&GROUP_ID)
  }

  pub fn fill_padding(&mut self) -> Result<&mut Self, CreateError> {
    self.apply(&AGE_RATINGS)
  }

  pub fn set_content_count(&mut self) -> Result<&mut Self, CreateError> {
    self.apply(&CONTENT_COUNT)
  }

  pub fn set_content_type(&mut self) -> Result<&mut Self, CreateError> {
    self.apply(&CONTENT_TYPE)
  }

  pub fn compute_content_size(&mut self) -> Result<&mut Self, CreateError> {
    self.apply(&CONTENT_SIZE)
  }

  pub fn compute_digest(&mut self) -> Result<&mut Self, CreateError> {
    self.apply(&CONTENT_DIGEST)
  }

  /// Writes one field of the table into the record.
  pub fn apply(&mut self, field: &Field) -> Result<&mut Self, CreateError> {
    debug!(
      "writing {} at 0x{:03X} ({} bytes)",
      field.name, field.offset, field.len
    );

    let dest = &mut self.record.as_mut_bytes()[field.range()];
    match field.value {
      FieldValue::Copy { from, transform } => {
        read_at(self.source, from, dest).context(ReadFieldSnafu {
          field: field.name,
          offset: from,
          len: field.len,
        })?;
        transform.apply(dest);
      }
      FieldValue::Repeat(value) => dest.fill(value),
      FieldValue::U16(value) => dest.copy_from_slice(&value.to_be_bytes()),
      FieldValue::ContentSize => dest.copy_from_slice(&content_size(self.source)?.to_be_bytes()),
      FieldValue::ContentDigest => dest.copy_from_slice(&content_digest::<D, R>(self.source)?),
    }

    Ok(self)
  }

  /// The record as filled so far.
  pub fn record(&self) -> &TitleMetadata {
    &self.record
  }

  /// Applies every field and hands back the finished record.
  pub fn build(mut self) -> Result<TitleMetadata, CreateError> {
    for field in &FIELDS {
      self.apply(field)?;
    }

    Ok(self.record)
  }
}

/// Creates a descriptor for `source`, hashing it with SHA-1.
pub fn create<R: Read + Seek>(source: &mut R) -> Result<TitleMetadata, CreateError> {
  create_with::<Sha1, R>(source)
}

/// Creates a descriptor for `source` with any 160 bit digest.
pub fn create_with<D, R>(source: &mut R) -> Result<TitleMetadata, CreateError>
where
  D: Digest<OutputSize = U20>,
  R: Read + Seek,
{
  TmdBuilder::<R, D>::new(source).build()
}

/// Length of `source` as stored in the descriptor. Sources past 4 GiB wrap.
pub fn content_size<S: Seek>(source: &mut S) -> Result<u32, CreateError> {
  let len = source.seek(SeekFrom::End(0)).context(MeasureSourceSnafu)?;
  Ok(len as u32)
}

/// Hashes `source` from its first byte to its last, whatever its position.
pub fn content_digest<D, R>(source: &mut R) -> Result<[u8; 20], CreateError>
where
  D: Digest<OutputSize = U20>,
  R: Read + Seek,
{
  source.rewind().context(HashSourceSnafu)?;

  let mut hasher = D::new();
  let mut buffer = [0u8; DIGEST_CHUNK_SIZE];
  loop {
    let read = match source.read(&mut buffer) {
      Ok(0) => break,
      Ok(read) => read,
      Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
      Err(error) => return Err(error).context(HashSourceSnafu),
    };
    hasher.update(&buffer[..read]);
  }

  let mut digest = [0u8; 20];
  digest.copy_from_slice(&hasher.finalize());
  Ok(digest)
}

fn read_at<R: Read + Seek>(source: &mut R, offset: u64, buffer: &mut [u8]) -> io::Result<()> {
  source.seek(SeekFrom::Start(offset))?;
  source.read_exact(buffer)
}
