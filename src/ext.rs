use bytes::Buf;
use std::io::{Error, ErrorKind, Result};

macro_rules! checked_read {
    ($($(#[$doc:meta])* $name:ident -> $ty:ty = $get:ident, $size:expr;)*) => {
        $(
            $(#[$doc])*
            fn $name(&mut self) -> Result<$ty> {
                if self.remaining() >= $size {
                    Ok(self.$get())
                } else {
                    Err(eof($size))
                }
            }
        )*
    };
}

fn eof(wanted: usize) -> Error {
    Error::new(ErrorKind::UnexpectedEof, format!("self.remaining() < {}", wanted))
}

/// Trait containing functions for reading integers from `Buf`
/// Wraps existing functions, providing a safer API without panics
pub trait BufExt: Buf {
    checked_read! {
        /// Reads an unsigned byte from `self`
        read_u8 -> u8 = get_u8, 1;
        /// Reads an unsigned big endian short from `self`
        read_u16_be -> u16 = get_u16, 2;
        /// Reads a big endian single precision float from `self`
        read_f32_be -> f32 = get_f32, 4;
    }

    /// Advances past `n` bytes, failing if fewer are available
    fn skip(&mut self, n: usize) -> Result<()> {
        if self.remaining() >= n {
            self.advance(n);
            Ok(())
        } else {
            Err(eof(n))
        }
    }

    /// Reads a big endian u16 length followed by that many bytes of UTF-8
    fn read_string_u16(&mut self) -> crate::Result<String> {
        let len = self.read_u16_be()? as usize;
        if self.remaining() < len {
            return Err(eof(len).into());
        }
        let bytes = self.copy_to_bytes(len);
        Ok(std::str::from_utf8(&bytes)?.to_string())
    }
}

impl<B: Buf> BufExt for B {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_fail_instead_of_panicking() {
        let mut buf = &[0x01u8][..];
        assert_eq!(buf.read_u16_be().unwrap_err().kind(), ErrorKind::UnexpectedEof);
        assert_eq!(buf.read_u8().unwrap(), 1);
        assert!(buf.read_u8().is_err());
    }

    #[test]
    fn skip_is_bounds_checked() {
        let mut buf = &[1u8, 2, 3][..];
        assert!(buf.skip(4).is_err());
        buf.skip(2).unwrap();
        assert_eq!(buf.read_u8().unwrap(), 3);
    }

    #[test]
    fn reads_length_prefixed_strings() {
        let mut buf = &[0x00, 0x02, b'h', b'i', 0xff][..];
        assert_eq!(buf.read_string_u16().unwrap(), "hi");
        assert_eq!(buf.read_u8().unwrap(), 0xff);

        let mut short = &[0x00, 0x05, b'h'][..];
        assert!(short.read_string_u16().is_err());
    }
}
