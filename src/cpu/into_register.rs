///
/// Conversions between a 32-bit register and the narrower or signed views the instructions
/// work with. Signed types are sign-extended on the way in, unsigned ones zero-extended, which
/// is exactly what the sub-word loads need.
///
pub trait IntoRegister {
    fn into_register(self) -> u32;
}

macro_rules! impl_into_reg {
    ($($type:ty => $via:ty),* $(,)?) => {
        $(
            impl IntoRegister for $type {
                #[inline]
                fn into_register(self) -> u32 {
                    self as $via as u32
                }
            }
        )*
    };
}

impl_into_reg! {
    u32 => u32,
    i32 => i32,
    u16 => u32,
    i16 => i32,
    u8 => u32,
    i8 => i32,
}

impl IntoRegister for bool {
    #[inline]
    fn into_register(self) -> u32 {
        self as u32
    }
}

pub trait FromRegister {
    fn from_register(x: u32) -> Self;
}

macro_rules! impl_from_reg {
    ($($type:ty),*) => {
        $(
            impl FromRegister for $type {
                #[inline]
                fn from_register(x: u32) -> Self {
                    x as $type
                }
            }
        )*
    };
}

impl_from_reg!(u32, i32);
