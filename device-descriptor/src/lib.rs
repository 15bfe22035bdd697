//! Typed descriptions of memory-mapped or bus-addressed device registers.
//!
//! A register is a plain value of a fixed width. Each named field of a register is a
//! [`FieldValue`] enumeration that knows its own position, width and mask, and is accessed
//! through a [`Field`] proxy which only ever touches the bits covered by that mask.
//!
//! Registers are normally declared with the [`device!`] macro.

#![no_std]

use core::marker::PhantomData;

pub trait RegisterWidthType: Copy + PartialEq {
    const WIDTH: u8;

    fn from_32(data: u32) -> Self;
    fn to_32(self) -> u32;
}

impl RegisterWidthType for u8 {
    const WIDTH: u8 = 8;

    fn from_32(data: u32) -> Self {
        debug_assert!(data <= u8::MAX as u32);
        data as u8
    }

    fn to_32(self) -> u32 {
        self as u32
    }
}

impl RegisterWidthType for u16 {
    const WIDTH: u8 = 16;

    fn from_32(data: u32) -> Self {
        debug_assert!(data <= u16::MAX as u32);
        data as u16
    }

    fn to_32(self) -> u32 {
        self as u32
    }
}

/// Raw access to the bits of a register value.
pub trait Proxy: Copy {
    type RegisterWidth: RegisterWidthType;

    fn bits(&self) -> Self::RegisterWidth;
    fn from_bits(bits: Self::RegisterWidth) -> Self;
}

pub trait ReadOnlyRegister: Proxy {
    /// Pointer (register address) byte.
    const ADDRESS: u8;
    const NAME: &'static str;
}

/// A register that can be written. Only registers with a known power-on value are writable.
pub trait Register: ReadOnlyRegister {
    const DEFAULT_VALUE: Self::RegisterWidth;

    /// Builds a register value starting from the power-on default.
    #[inline(always)]
    fn new(f: impl FnOnce(Self) -> Self) -> Self {
        f(Self::from_bits(Self::DEFAULT_VALUE))
    }

    #[inline(always)]
    fn modify(self, f: impl FnOnce(Self) -> Self) -> Self {
        f(self)
    }
}

/// The set of legal values of one register field.
pub trait FieldValue<RWT: RegisterWidthType>: Copy + Sized {
    const NAME: &'static str;
    const POS: u8;
    const WIDTH: u8;
    /// The bits this field occupies, in register position.
    const MASK: RWT;

    /// The value right-aligned, as it would be read out of the field.
    fn to_field_bits(self) -> RWT;
    fn from_field_bits(bits: RWT) -> Option<Self>;

    /// The value shifted into field position.
    #[inline(always)]
    fn bits(self) -> RWT {
        RWT::from_32(self.to_field_bits().to_32() << Self::POS)
    }

    /// Decodes a value given in field position. Bits outside of the mask, or a pattern that
    /// is not one of the enumerated values, are rejected.
    fn try_from_bits(bits: RWT) -> Result<Self, InvalidFieldValue> {
        let raw = bits.to_32();
        let invalid = InvalidFieldValue {
            field: Self::NAME,
            bits: raw,
        };

        if raw & !Self::MASK.to_32() != 0 {
            return Err(invalid);
        }

        Self::from_field_bits(RWT::from_32(raw >> Self::POS)).ok_or(invalid)
    }
}

/// A field was given, or holds, a bit pattern that is not one of its enumerated values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidFieldValue {
    pub field: &'static str,
    /// The offending bits, in register position.
    pub bits: u32,
}

/// Accessor for one field of a register value.
#[must_use]
pub struct Field<T, R> {
    _marker: PhantomData<T>,
    reg: R,
}

impl<T, R> Field<T, R> {
    #[inline(always)]
    pub const fn new(reg: R) -> Self {
        Field {
            _marker: PhantomData,
            reg,
        }
    }
}

impl<T, R, RWT> Field<T, R>
where
    T: FieldValue<RWT>,
    R: Proxy<RegisterWidth = RWT>,
    RWT: RegisterWidthType,
{
    const _CONST_CHECK: () = assert!(T::POS + T::WIDTH <= RWT::WIDTH);

    #[inline(always)]
    fn masked(&self) -> u32 {
        self.reg.bits().to_32() & T::MASK.to_32()
    }

    #[inline(always)]
    pub fn read_field_bits(&self) -> RWT {
        #[allow(clippy::let_unit_value)]
        let _ = Self::_CONST_CHECK;
        RWT::from_32(self.masked() >> T::POS)
    }

    #[inline(always)]
    pub fn read(&self) -> Option<T> {
        T::from_field_bits(self.read_field_bits())
    }

    pub fn try_read(&self) -> Result<T, InvalidFieldValue> {
        self.read().ok_or(InvalidFieldValue {
            field: T::NAME,
            bits: self.masked(),
        })
    }

    /// Returns whether the field, and only the field, holds `value`.
    #[inline(always)]
    pub fn is(&self, value: T) -> bool {
        self.masked() == value.bits().to_32()
    }

    /// Replaces the field's bits with `value`, leaving every other bit of the register as is.
    #[inline(always)]
    pub fn write(self, value: T) -> R {
        let cleared = self.reg.bits().to_32() & !T::MASK.to_32();

        R::from_bits(RWT::from_32(cleared | value.bits().to_32()))
    }

    /// Like [`Field::write`], but takes the value in field position and validates it first.
    pub fn write_bits(self, bits: RWT) -> Result<R, InvalidFieldValue> {
        T::try_from_bits(bits).map(|value| self.write(value))
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! field_width {
    ($pos:literal) => {
        1
    };
    ($start:literal .. $end:literal) => {
        $end - $start
    };
}

/// Declares a set of registers.
///
/// ```
/// use device_descriptor::*;
///
/// device! {
///     /// Control register
///     Control(u8 @ 0x01, default = 0x05) {
///         /// Power state
///         power @ 7 => Power {
///             Off = 0,
///             On = 1
///         },
///         speed @ 0..3 => Speed {
///             Slow = 0b001,
///             Fast = 0b101
///         }
///     }
///     Status(u8 @ 0x02) {}
/// }
///
/// let reg = Control::default().power().write(Power::On);
///
/// assert_eq!(reg.bits(), 0x85);
/// assert_eq!(reg.speed().read(), Some(Speed::Fast));
/// assert_eq!(Speed::MASK, 0b0000_0111);
/// assert_eq!(Status::ADDRESS, 0x02);
/// ```
#[macro_export]
macro_rules! device {
    ($(
        $(#[$reg_meta:meta])*
        $reg:ident($rwt:ident @ $addr:literal $(, default = $default:literal)?) {
            $(
                $(#[$field_meta:meta])*
                $field:ident @ $start:literal $(.. $end:literal)? => $type:ident {
                    $(
                        $(#[$variant_meta:meta])*
                        $variant:ident = $value:literal
                    ),+ $(,)?
                }
            ),* $(,)?
        }
    )+) => {
        $(
            $(#[$reg_meta])*
            #[derive(Debug, Copy, Clone, PartialEq, Eq)]
            #[cfg_attr(feature = "defmt", derive(defmt::Format))]
            #[must_use]
            pub struct $reg {
                value: $rwt,
            }

            impl $crate::Proxy for $reg {
                type RegisterWidth = $rwt;

                #[inline(always)]
                fn bits(&self) -> $rwt {
                    self.value
                }

                #[inline(always)]
                fn from_bits(bits: $rwt) -> Self {
                    Self { value: bits }
                }
            }

            impl $crate::ReadOnlyRegister for $reg {
                const ADDRESS: u8 = $addr;
                const NAME: &'static str = stringify!($reg);
            }

            $(
                impl $crate::Register for $reg {
                    const DEFAULT_VALUE: $rwt = $default;
                }

                impl Default for $reg {
                    #[inline(always)]
                    fn default() -> Self {
                        Self { value: $default }
                    }
                }
            )?

            impl $reg {
                $(
                    $(#[$field_meta])*
                    #[inline(always)]
                    pub fn $field(self) -> $crate::Field<$type, Self> {
                        $crate::Field::new(self)
                    }
                )*
            }

            $(
                #[doc = concat!(
                    "Values of the `", stringify!($field), "` field of [`", stringify!($reg), "`]."
                )]
                #[derive(Debug, Copy, Clone, PartialEq, Eq)]
                #[cfg_attr(feature = "defmt", derive(defmt::Format))]
                pub enum $type {
                    $(
                        $(#[$variant_meta])*
                        $variant = $value,
                    )+
                }

                impl $type {
                    /// Iterates over every legal value of the field.
                    pub fn all() -> impl Iterator<Item = Self> {
                        [$(Self::$variant),+].into_iter()
                    }
                }

                impl $crate::FieldValue<$rwt> for $type {
                    const NAME: &'static str = stringify!($field);
                    const POS: u8 = $start;
                    const WIDTH: u8 = $crate::field_width!($start $(.. $end)?);
                    const MASK: $rwt = (((1u32 << Self::WIDTH) - 1) << Self::POS) as $rwt;

                    #[inline(always)]
                    fn to_field_bits(self) -> $rwt {
                        self as $rwt
                    }

                    fn from_field_bits(bits: $rwt) -> Option<Self> {
                        match bits {
                            $($value => Some(Self::$variant),)+
                            _ => None,
                        }
                    }
                }

                impl core::convert::TryFrom<$rwt> for $type {
                    type Error = $crate::InvalidFieldValue;

                    fn try_from(bits: $rwt) -> Result<Self, Self::Error> {
                        <Self as $crate::FieldValue<$rwt>>::try_from_bits(bits)
                    }
                }

                impl From<$type> for $rwt {
                    fn from(value: $type) -> $rwt {
                        <$type as $crate::FieldValue<$rwt>>::bits(value)
                    }
                }
            )*
        )+
    };
}
