use byteorder::{BigEndian, ByteOrder};
use device_descriptor::{ReadOnlyRegister, Register};
use embedded_hal::i2c::I2c;
use embedded_hal_async::i2c::I2c as AsyncI2c;
use register_access::{AsyncRegisterAccess, RegisterAccess};

/// Two-wire interface of the ADS1115.
///
/// Registers are selected by writing a pointer byte. A register read is a pointer write
/// followed by a repeated-start read of two bytes, a register write is the pointer byte
/// followed by the two data bytes. Data is transferred most significant byte first.
pub struct Ads1115I2cInterface<I> {
    pub i2c: I,
    pub address: u8,
}

impl<I> Ads1115I2cInterface<I> {
    fn write_frame<R>(reg: R) -> [u8; 3]
    where
        R: Register<RegisterWidth = u16>,
    {
        let mut frame = [R::ADDRESS, 0, 0];
        BigEndian::write_u16(&mut frame[1..], reg.bits());
        frame
    }

    fn decode<R>(buffer: &[u8; 2]) -> R
    where
        R: ReadOnlyRegister<RegisterWidth = u16>,
    {
        R::from_bits(BigEndian::read_u16(buffer))
    }
}

impl<I> RegisterAccess<u16> for Ads1115I2cInterface<I>
where
    I: I2c,
{
    type Error = I::Error;

    fn read_register<R>(&mut self) -> Result<R, Self::Error>
    where
        R: ReadOnlyRegister<RegisterWidth = u16>,
    {
        let mut buffer = [0; 2];
        self.i2c.write_read(self.address, &[R::ADDRESS], &mut buffer)?;
        Ok(Self::decode(&buffer))
    }

    fn write_register<R>(&mut self, reg: R) -> Result<(), Self::Error>
    where
        R: Register<RegisterWidth = u16>,
    {
        self.i2c.write(self.address, &Self::write_frame(reg))
    }
}

impl<I> AsyncRegisterAccess<u16> for Ads1115I2cInterface<I>
where
    I: AsyncI2c,
{
    type Error = I::Error;

    async fn read_register_async<R>(&mut self) -> Result<R, Self::Error>
    where
        R: ReadOnlyRegister<RegisterWidth = u16>,
    {
        let mut buffer = [0; 2];
        self.i2c
            .write_read(self.address, &[R::ADDRESS], &mut buffer)
            .await?;
        Ok(Self::decode(&buffer))
    }

    async fn write_register_async<R>(&mut self, reg: R) -> Result<(), Self::Error>
    where
        R: Register<RegisterWidth = u16>,
    {
        self.i2c.write(self.address, &Self::write_frame(reg)).await
    }
}
