//! Binary encoding used for hashing and size accounting.

mod binary_writer;

pub use binary_writer::BinaryWriter;

/// Types with a canonical binary encoding.
pub trait Serializable {
    fn serialize(&self, writer: &mut BinaryWriter);

    /// Encoded length in bytes.
    fn size(&self) -> usize {
        self.to_array().len()
    }

    fn to_array(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        self.serialize(&mut writer);
        writer.into_bytes()
    }
}

/// Encoded length of a var-int prefix for `value`.
pub const fn var_int_size(value: u64) -> usize {
    if value < 0xFD {
        1
    } else if value <= 0xFFFF {
        3
    } else if value <= 0xFFFF_FFFF {
        5
    } else {
        9
    }
}
