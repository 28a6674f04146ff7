use zerocopy::{
  FromBytes, Immutable, IntoBytes, KnownLayout,
  big_endian::{U16, U32},
};

pub const TMD_SIZE: usize = 0x208;

/// Byte overlay of an unsigned DSiWare title metadata record.
///
/// Only the fields the assembler fills are public, everything else is
/// reserved space which stays zeroed.
#[derive(Debug, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct TitleMetadata {
  _signature: [u8; 0x140],
  _issuer: [u8; 0x40],
  _versions: [u8; 4],
  _system_version: [u8; 8],
  /// Upper half of the title id, stored big-endian.
  pub title_id_high: [u8; 4],
  /// Lower half of the title id, which is the game code.
  pub title_id_low: [u8; 4],
  _title_type: [u8; 4],
  /// Maker code.
  pub group_id: [u8; 2],
  _save_sizes: [u8; 0x10],
  /// One byte per ratings board.
  pub age_ratings: [u8; 0x10],
  _reserved: [u8; 0x24],
  pub content_count: U16,
  _boot_content: [u8; 4],
  pub content: ContentChunk,
}

/// The single content record trailing the header.
#[derive(Debug, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct ContentChunk {
  _content_id: [u8; 4],
  _index: [u8; 2],
  pub content_type: U16,
  // the format has room for a 64 bit size, only the low word is populated
  _size_high: [u8; 4],
  pub size: U32,
  pub digest: [u8; 20],
}

const _: () = assert!(size_of::<TitleMetadata>() == TMD_SIZE);
const _: () = assert!(size_of::<ContentChunk>() == 0x24);

impl TitleMetadata {
  pub fn title_id(&self) -> u64 {
    let [a, b, c, d] = self.title_id_high;
    let [e, f, g, h] = self.title_id_low;
    u64::from_be_bytes([a, b, c, d, e, f, g, h])
  }

  pub fn game_code(&self) -> [u8; 4] {
    self.title_id_low
  }

  pub fn maker_code(&self) -> [u8; 2] {
    self.group_id
  }

  pub fn content_size(&self) -> u32 {
    self.content.size.get()
  }

  pub fn content_digest(&self) -> [u8; 20] {
    self.content.digest
  }
}
