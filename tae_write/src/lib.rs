//! Writing for the fixed layout parts of TAE records.
//!
//! Types implementing [TaeWrite] have no offsets of their own.
//! Offsets and deferred placeholders are handled by the writer in `tae_lib`,
//! which calls [TaeWrite::tae_write] for inline values like enum tags or small structs.
//!
//! Structs and unit enums can derive the trait.
/*!
```rust
use tae_write::TaeWrite;

#[derive(TaeWrite)]
struct Header {
    flags: u8,
    #[taewrite(pad_after = 3)]
    kind: Kind,
    id: i32,
}

#[derive(TaeWrite, Clone, Copy)]
#[taewrite(repr(u8))]
enum Kind {
    A = 1,
    B = 2,
}

let mut bytes = Vec::new();
Header { flags: 1, kind: Kind::B, id: -1 }.tae_write(&mut bytes).unwrap();
assert_eq!(vec![1, 2, 0, 0, 0, 255, 255, 255, 255], bytes);
```
 */
use std::io::Write;

pub use tae_write_derive::TaeWrite;

/// A trait for writing types that are stored inline in TAE records.
pub trait TaeWrite {
    /// Writes the little endian byte representation of `self` to `writer`.
    fn tae_write<W: Write>(&self, writer: &mut W) -> std::io::Result<()>;

    /// The number of bytes written by [tae_write](crate::TaeWrite::tae_write) including any padding.
    fn size_in_bytes(&self) -> u64;
}

macro_rules! tae_write_impl {
    ($($id:ident),*) => {
        $(
            impl TaeWrite for $id {
                fn tae_write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
                    writer.write_all(&self.to_le_bytes())?;
                    Ok(())
                }

                fn size_in_bytes(&self) -> u64 {
                    std::mem::size_of::<Self>() as u64
                }
            }
        )*
    }
}

tae_write_impl!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl TaeWrite for bool {
    fn tae_write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&[*self as u8])
    }

    fn size_in_bytes(&self) -> u64 {
        1
    }
}

impl<T: TaeWrite> TaeWrite for [T] {
    fn tae_write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for element in self {
            element.tae_write(writer)?;
        }
        Ok(())
    }

    fn size_in_bytes(&self) -> u64 {
        self.iter().map(|e| e.size_in_bytes()).sum()
    }
}

impl<T: TaeWrite, const N: usize> TaeWrite for [T; N] {
    fn tae_write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        self.as_slice().tae_write(writer)
    }

    fn size_in_bytes(&self) -> u64 {
        self.as_slice().size_in_bytes()
    }
}

impl<T: TaeWrite> TaeWrite for Vec<T> {
    fn tae_write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        self.as_slice().tae_write(writer)
    }

    fn size_in_bytes(&self) -> u64 {
        self.as_slice().size_in_bytes()
    }
}

impl<T: TaeWrite> TaeWrite for Option<T> {
    fn tae_write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        match self {
            Some(value) => value.tae_write(writer),
            None => Ok(()),
        }
    }

    fn size_in_bytes(&self) -> u64 {
        // None values are skipped entirely.
        match self {
            Some(value) => value.size_in_bytes(),
            None => 0,
        }
    }
}
