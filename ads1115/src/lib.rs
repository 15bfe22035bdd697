//! Driver for the ADS1115 16-bit, 4-channel delta-sigma ADC, via the `embedded-hal` I2C traits.
//!
//! The driver keeps a copy of the configuration register in memory. The field setters only
//! change that copy; [`Ads1115::commit`] writes it to the device and [`Ads1115::refresh`]
//! reads the device back into it. [`Ads1115::config_state`] tells whether the copy has
//! changes that were not written yet.
//!
//! Both blocking and async (`*_async`) variants of the bus operations are provided.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod descriptors;
pub mod ll;

use embedded_hal::i2c::I2c;
use embedded_hal_async::i2c::I2c as AsyncI2c;
use register_access::{AsyncRegisterReader, AsyncRegisterWriter, RegisterReader, RegisterWriter};

pub use descriptors::{
    ComparatorLatch, ComparatorMode, ComparatorPolarity, ComparatorQueue, Config, Conversion,
    DataRate, Gain, HiThresh, InputMux, LoThresh, Mode, Status,
};
pub use device_descriptor::{FieldValue, InvalidFieldValue, Proxy, ReadOnlyRegister, Register};

/// Bus address, selected by what the ADDR pin is connected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Address {
    #[default]
    Gnd,
    Vdd,
    Sda,
    Scl,
}

impl Address {
    /// Convert into the right-aligned 7-bit address
    pub const fn into_addr(self) -> u8 {
        match self {
            Address::Gnd => 0x48,
            Address::Vdd => 0x49,
            Address::Sda => 0x4A,
            Address::Scl => 0x4B,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The bus transfer failed.
    Transport(E),
    InvalidFieldValue(InvalidFieldValue),
    /// The device was still busy after the configured number of status polls.
    Timeout,
    /// The configuration read back after a write differs from what was written.
    ReadbackMismatch,
}

impl<E> From<InvalidFieldValue> for Error<E> {
    fn from(error: InvalidFieldValue) -> Self {
        Error::InvalidFieldValue(error)
    }
}

/// Whether the in-memory configuration matches what was last written to or read from the
/// device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigState {
    Clean,
    /// Setters changed the configuration since the last successful commit or refresh.
    Dirty,
}

/// How many times a single-shot conversion is polled for completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollLimit {
    /// Poll until the device reports ready.
    #[default]
    Unbounded,
    /// Give up with [`Error::Timeout`] after this many status reads. At least one read is
    /// always made.
    Attempts(u32),
}

impl PollLimit {
    fn is_exhausted(self, attempts: u32) -> bool {
        match self {
            PollLimit::Unbounded => false,
            PollLimit::Attempts(max) => attempts >= max,
        }
    }
}

/// A raw conversion result.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    sample: i16,
}

impl Sample {
    /// Number of codes between zero and the full-scale value.
    pub const FULL_SCALE_CODES: f32 = 32768.0;

    /// Interprets the contents of the conversion register as two's complement.
    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self { sample: raw as i16 }
    }

    #[inline]
    pub fn raw(self) -> i16 {
        self.sample
    }

    /// Converts the sample to volts, given the gain it was taken with.
    ///
    /// ```rust
    /// # use ads1115::{Gain, Sample};
    /// assert_eq!(Sample::from_raw(0x0000).voltage(Gain::Fsr4_096), 0.0);
    /// assert_eq!(Sample::from_raw(0x8000).voltage(Gain::Fsr4_096), -4.096);
    /// assert_eq!(Sample::from_raw(0x4000).voltage(Gain::Fsr2_048), 1.024);
    /// ```
    #[inline]
    pub fn voltage(self, gain: Gain) -> f32 {
        gain.full_scale_range() * self.sample as f32 / Self::FULL_SCALE_CODES
    }
}

pub struct Ads1115<I> {
    iface: ll::Ads1115I2cInterface<I>,
    config: Config,
    state: ConfigState,
    poll_limit: PollLimit,
}

impl<I> Ads1115<I> {
    fn unsynchronized(i2c: I, address: Address) -> Self {
        Self {
            iface: ll::Ads1115I2cInterface {
                i2c,
                address: address.into_addr(),
            },
            config: Config::default(),
            state: ConfigState::Dirty,
            poll_limit: PollLimit::default(),
        }
    }

    pub fn address(&self) -> u8 {
        self.iface.address
    }

    /// The in-memory configuration.
    pub fn config(&self) -> Config {
        self.config
    }

    pub fn config_state(&self) -> ConfigState {
        self.state
    }

    pub fn poll_limit(&self) -> PollLimit {
        self.poll_limit
    }

    pub fn set_poll_limit(&mut self, limit: PollLimit) {
        self.poll_limit = limit;
    }

    pub fn with_poll_limit(mut self, limit: PollLimit) -> Self {
        self.set_poll_limit(limit);
        self
    }

    fn update(&mut self, f: impl FnOnce(Config) -> Config) {
        let updated = self.config.modify(f);
        if updated != self.config {
            self.config = updated;
            self.state = ConfigState::Dirty;
        }
    }

    pub fn set_input_mux(&mut self, mux: InputMux) {
        self.update(|reg| reg.mux().write(mux));
    }

    pub fn set_gain(&mut self, gain: Gain) {
        self.update(|reg| reg.pga().write(gain));
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.update(|reg| reg.mode().write(mode));
    }

    pub fn set_data_rate(&mut self, rate: DataRate) {
        self.update(|reg| reg.dr().write(rate));
    }

    /// The gain of the in-memory configuration.
    pub fn gain(&self) -> Result<Gain, InvalidFieldValue> {
        self.config.pga().try_read()
    }

    /// Converts a sample to volts using the gain of the in-memory configuration.
    ///
    /// The result is only meaningful if the configuration matches the one the sample was
    /// taken with.
    pub fn to_volts(&self, sample: Sample) -> Result<f32, InvalidFieldValue> {
        Ok(sample.voltage(self.gain()?))
    }

    pub fn inner_mut(&mut self) -> &mut I {
        &mut self.iface.i2c
    }

    /// Gives back the bus.
    pub fn release(self) -> I {
        self.iface.i2c
    }

    fn is_single_shot(&self) -> bool {
        self.config.mode().is(Mode::SingleShot)
    }

    fn is_busy(&self) -> bool {
        self.config.os().is(Status::Busy)
    }

    fn arm_conversion(&mut self) {
        self.update(|reg| reg.os().write(Status::START));
    }
}

impl<I> Ads1115<I>
where
    I: I2c,
{
    /// Binds the driver to the device at `address` and reads its current configuration.
    pub fn new(i2c: I, address: Address) -> Result<Self, Error<I::Error>> {
        let mut adc = Self::unsynchronized(i2c, address);
        adc.refresh()?;

        debug!("ADS1115 at {} config: {:?}", adc.address(), adc.config);

        Ok(adc)
    }

    /// Writes the in-memory configuration to the device.
    ///
    /// If this fails the device state is unknown; call [`Self::refresh`] to resynchronize.
    pub fn commit(&mut self) -> Result<(), Error<I::Error>> {
        trace!("Writing config {:?}", self.config);
        self.config.write(&mut self.iface).map_err(Error::Transport)?;
        self.state = ConfigState::Clean;
        Ok(())
    }

    /// Reads the device configuration into memory, discarding uncommitted changes.
    pub fn refresh(&mut self) -> Result<(), Error<I::Error>> {
        self.config = Config::read(&mut self.iface).map_err(Error::Transport)?;
        self.state = ConfigState::Clean;
        trace!("Read config {:?}", self.config);
        Ok(())
    }

    /// Commits the configuration and reads it back. On mismatch, the in-memory configuration
    /// holds what the device reported.
    pub fn commit_verified(&mut self) -> Result<(), Error<I::Error>> {
        let written = self.config;
        self.commit()?;
        self.refresh()?;

        if written.mask_off_status_bit() != self.config.mask_off_status_bit() {
            warn!("Config mismatch: {:?} != {:?}", self.config, written);
            return Err(Error::ReadbackMismatch);
        }

        Ok(())
    }

    /// Reads a conversion result.
    ///
    /// In single-shot mode this starts a conversion, by committing the configuration with the
    /// status bit set, and polls the status bit until the conversion completes. In continuous
    /// mode the latest result is read right away.
    pub fn read_sample(&mut self) -> Result<Sample, Error<I::Error>> {
        if self.is_single_shot() {
            self.arm_conversion();
            self.commit()?;

            let mut attempts: u32 = 0;
            loop {
                self.refresh()?;
                attempts = attempts.saturating_add(1);

                if !self.is_busy() {
                    break;
                }
                if self.poll_limit.is_exhausted(attempts) {
                    warn!("Conversion not ready after {} polls", attempts);
                    return Err(Error::Timeout);
                }
            }
            trace!("Conversion ready after {} polls", attempts);
        }

        let conversion = Conversion::read(&mut self.iface).map_err(Error::Transport)?;
        Ok(conversion.sample())
    }

    /// Reads a conversion result and converts it to volts.
    pub fn read_voltage(&mut self) -> Result<f32, Error<I::Error>> {
        let sample = self.read_sample()?;
        Ok(self.to_volts(sample)?)
    }
}

// Async implementations

impl<I> Ads1115<I>
where
    I: AsyncI2c,
{
    pub async fn new_async(i2c: I, address: Address) -> Result<Self, Error<I::Error>> {
        let mut adc = Self::unsynchronized(i2c, address);
        adc.refresh_async().await?;

        debug!("ADS1115 at {} config: {:?}", adc.address(), adc.config);

        Ok(adc)
    }

    pub async fn commit_async(&mut self) -> Result<(), Error<I::Error>> {
        trace!("Writing config {:?}", self.config);
        self.config
            .write_async(&mut self.iface)
            .await
            .map_err(Error::Transport)?;
        self.state = ConfigState::Clean;
        Ok(())
    }

    pub async fn refresh_async(&mut self) -> Result<(), Error<I::Error>> {
        self.config = Config::read_async(&mut self.iface)
            .await
            .map_err(Error::Transport)?;
        self.state = ConfigState::Clean;
        trace!("Read config {:?}", self.config);
        Ok(())
    }

    pub async fn commit_verified_async(&mut self) -> Result<(), Error<I::Error>> {
        let written = self.config;
        self.commit_async().await?;
        self.refresh_async().await?;

        if written.mask_off_status_bit() != self.config.mask_off_status_bit() {
            warn!("Config mismatch: {:?} != {:?}", self.config, written);
            return Err(Error::ReadbackMismatch);
        }

        Ok(())
    }

    pub async fn read_sample_async(&mut self) -> Result<Sample, Error<I::Error>> {
        if self.is_single_shot() {
            self.arm_conversion();
            self.commit_async().await?;

            let mut attempts: u32 = 0;
            loop {
                self.refresh_async().await?;
                attempts = attempts.saturating_add(1);

                if !self.is_busy() {
                    break;
                }
                if self.poll_limit.is_exhausted(attempts) {
                    warn!("Conversion not ready after {} polls", attempts);
                    return Err(Error::Timeout);
                }
            }
            trace!("Conversion ready after {} polls", attempts);
        }

        let conversion = Conversion::read_async(&mut self.iface)
            .await
            .map_err(Error::Transport)?;
        Ok(conversion.sample())
    }

    pub async fn read_voltage_async(&mut self) -> Result<f32, Error<I::Error>> {
        let sample = self.read_sample_async().await?;
        Ok(self.to_volts(sample)?)
    }
}
