//! Fixed-layout messages for typed topics

/// A message with a fixed little-endian wire size
///
/// Typed topics store exactly `SIZE` bytes per slot, so a message type can
/// only be used with a topic whose `msg_size` equals `SIZE`.
///
/// ```
/// use epochbus::FixedMessage;
///
/// #[derive(Debug, PartialEq)]
/// struct Depth {
///     meters: f32,
///     stamp_us: u64,
/// }
///
/// impl FixedMessage for Depth {
///     const SIZE: usize = 12;
///
///     fn encode(&self, out: &mut [u8]) {
///         self.meters.encode(&mut out[..4]);
///         self.stamp_us.encode(&mut out[4..12]);
///     }
///
///     fn decode(bytes: &[u8]) -> Self {
///         Self {
///             meters: f32::decode(&bytes[..4]),
///             stamp_us: u64::decode(&bytes[4..12]),
///         }
///     }
/// }
///
/// let mut raw = [0u8; Depth::SIZE];
/// let depth = Depth { meters: 3.5, stamp_us: 42 };
/// depth.encode(&mut raw);
/// assert_eq!(Depth::decode(&raw), depth);
/// ```
pub trait FixedMessage: Sized {
    /// Encoded size in bytes
    const SIZE: usize;

    /// Write exactly `SIZE` bytes into `out`
    fn encode(&self, out: &mut [u8]);

    /// Read from the first `SIZE` bytes of `bytes`
    fn decode(bytes: &[u8]) -> Self;
}

macro_rules! impl_fixed_numeric {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FixedMessage for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn encode(&self, out: &mut [u8]) {
                    out[..Self::SIZE].copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn decode(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::SIZE]);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_fixed_numeric!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl<T: FixedMessage, const N: usize> FixedMessage for [T; N] {
    const SIZE: usize = T::SIZE * N;

    fn encode(&self, out: &mut [u8]) {
        for (value, chunk) in self.iter().zip(out.chunks_exact_mut(T::SIZE)) {
            value.encode(chunk);
        }
    }

    fn decode(bytes: &[u8]) -> Self {
        std::array::from_fn(|i| T::decode(&bytes[i * T::SIZE..(i + 1) * T::SIZE]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_sizes() {
        assert_eq!(u8::SIZE, 1);
        assert_eq!(i16::SIZE, 2);
        assert_eq!(f32::SIZE, 4);
        assert_eq!(u64::SIZE, 8);
        assert_eq!(<[f32; 3]>::SIZE, 12);
        assert_eq!(<[[u16; 2]; 3]>::SIZE, 12);
    }

    #[test]
    fn test_little_endian_encoding() {
        let mut raw = [0u8; 4];
        0x0A0B_0C0Du32.encode(&mut raw);
        assert_eq!(raw, [0x0D, 0x0C, 0x0B, 0x0A]);
        assert_eq!(u32::decode(&raw), 0x0A0B_0C0D);
    }

    #[test]
    fn test_array_encoding() {
        let accel = [1.0f32, -2.5, 9.81];
        let mut raw = [0u8; 12];
        accel.encode(&mut raw);
        assert_eq!(&raw[4..8], &(-2.5f32).to_le_bytes());
        assert_eq!(<[f32; 3]>::decode(&raw), accel);
    }
}
