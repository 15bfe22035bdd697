//! Bus-agnostic register I/O.
//!
//! A driver implements [`RegisterAccess`] (and/or [`AsyncRegisterAccess`]) once for its bus
//! interface, after which every register type can be read with `Reg::read(&mut iface)` and
//! written with `reg.write(&mut iface)`.

#![no_std]
#![allow(async_fn_in_trait)]

use device_descriptor::{ReadOnlyRegister, Register, RegisterWidthType};

/// Moves whole registers over a bus, addressed by [`ReadOnlyRegister::ADDRESS`].
pub trait RegisterAccess<RWT>
where
    RWT: RegisterWidthType,
{
    type Error;

    fn read_register<R>(&mut self) -> Result<R, Self::Error>
    where
        R: ReadOnlyRegister<RegisterWidth = RWT>;

    fn write_register<R>(&mut self, reg: R) -> Result<(), Self::Error>
    where
        R: Register<RegisterWidth = RWT>;
}

/// Async counterpart of [`RegisterAccess`].
pub trait AsyncRegisterAccess<RWT>
where
    RWT: RegisterWidthType,
{
    type Error;

    async fn read_register_async<R>(&mut self) -> Result<R, Self::Error>
    where
        R: ReadOnlyRegister<RegisterWidth = RWT>;

    async fn write_register_async<R>(&mut self, reg: R) -> Result<(), Self::Error>
    where
        R: Register<RegisterWidth = RWT>;
}

/// Implemented for every register type; reads `Self` through any matching interface.
pub trait RegisterReader<RWT>: Sized
where
    RWT: RegisterWidthType,
{
    fn read<E>(iface: &mut impl RegisterAccess<RWT, Error = E>) -> Result<Self, E>;
}

pub trait AsyncRegisterReader<RWT>: Sized
where
    RWT: RegisterWidthType,
{
    async fn read_async<E>(iface: &mut impl AsyncRegisterAccess<RWT, Error = E>)
        -> Result<Self, E>;
}

/// Implemented for every writable register type.
///
/// Only registers with a [`Register::DEFAULT_VALUE`] can be written; read-only registers
/// such as conversion results have no `write`.
pub trait RegisterWriter<RWT>
where
    RWT: RegisterWidthType,
{
    fn write<E>(self, iface: &mut impl RegisterAccess<RWT, Error = E>) -> Result<(), E>;
}

pub trait AsyncRegisterWriter<RWT>
where
    RWT: RegisterWidthType,
{
    async fn write_async<E>(
        self,
        iface: &mut impl AsyncRegisterAccess<RWT, Error = E>,
    ) -> Result<(), E>;
}

impl<T> RegisterReader<T::RegisterWidth> for T
where
    T: ReadOnlyRegister,
{
    fn read<E>(iface: &mut impl RegisterAccess<T::RegisterWidth, Error = E>) -> Result<Self, E> {
        iface.read_register()
    }
}

impl<T> AsyncRegisterReader<T::RegisterWidth> for T
where
    T: ReadOnlyRegister,
{
    async fn read_async<E>(
        iface: &mut impl AsyncRegisterAccess<T::RegisterWidth, Error = E>,
    ) -> Result<Self, E> {
        iface.read_register_async().await
    }
}

impl<T> RegisterWriter<T::RegisterWidth> for T
where
    T: Register,
{
    fn write<E>(
        self,
        iface: &mut impl RegisterAccess<T::RegisterWidth, Error = E>,
    ) -> Result<(), E> {
        iface.write_register(self)
    }
}

impl<T> AsyncRegisterWriter<T::RegisterWidth> for T
where
    T: Register,
{
    async fn write_async<E>(
        self,
        iface: &mut impl AsyncRegisterAccess<T::RegisterWidth, Error = E>,
    ) -> Result<(), E> {
        iface.write_register_async(self).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use device_descriptor::{Proxy, ReadOnlyRegister};

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Scratch(u16);

    impl Proxy for Scratch {
        type RegisterWidth = u16;

        fn bits(&self) -> u16 {
            self.0
        }

        fn from_bits(bits: u16) -> Self {
            Self(bits)
        }
    }

    impl ReadOnlyRegister for Scratch {
        const ADDRESS: u8 = 0x07;
        const NAME: &'static str = "Scratch";
    }

    impl Register for Scratch {
        const DEFAULT_VALUE: u16 = 0;
    }

    /// Sixteen 16-bit registers in memory.
    #[derive(Default)]
    struct RegisterFile {
        registers: [u16; 16],
    }

    impl RegisterAccess<u16> for RegisterFile {
        type Error = ();

        fn read_register<R>(&mut self) -> Result<R, ()>
        where
            R: ReadOnlyRegister<RegisterWidth = u16>,
        {
            let value = self.registers.get(R::ADDRESS as usize).ok_or(())?;
            Ok(R::from_bits(*value))
        }

        fn write_register<R>(&mut self, reg: R) -> Result<(), ()>
        where
            R: Register<RegisterWidth = u16>,
        {
            let slot = self.registers.get_mut(R::ADDRESS as usize).ok_or(())?;
            *slot = reg.bits();
            Ok(())
        }
    }

    #[test]
    fn blanket_reader_and_writer_use_register_address() {
        let mut file = RegisterFile::default();

        Scratch(0xBEEF).write(&mut file).unwrap();
        assert_eq!(file.registers[7], 0xBEEF);

        file.registers[7] = 0x1234;
        assert_eq!(Scratch::read(&mut file), Ok(Scratch(0x1234)));
    }
}
