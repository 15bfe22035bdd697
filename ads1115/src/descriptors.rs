//! ADS1115 register map.

use device_descriptor::*;

device! {
    /// Holds the result of the last completed conversion as a 16-bit two's complement value.
    Conversion(u16 @ 0x00) {}

    /// Configuration register. Power-on value is `0x8583`.
    Config(u16 @ 0x01, default = 0x8583) {
        /// Operational status. Reading `Busy` means a conversion is in progress. Writing
        /// `Ready` in single-shot mode starts a single conversion; the bit clears itself.
        os @ 15 => Status {
            Busy = 0,
            Ready = 1
        },
        /// Input multiplexer
        mux @ 12..15 => InputMux {
            /// AINP = AIN0, AINN = AIN1
            Diff0_1 = 0,
            /// AINP = AIN0, AINN = AIN3
            Diff0_3 = 1,
            /// AINP = AIN1, AINN = AIN3
            Diff1_3 = 2,
            /// AINP = AIN2, AINN = AIN3
            Diff2_3 = 3,
            /// AINP = AIN0, AINN = GND
            Single0 = 4,
            /// AINP = AIN1, AINN = GND
            Single1 = 5,
            /// AINP = AIN2, AINN = GND
            Single2 = 6,
            /// AINP = AIN3, AINN = GND
            Single3 = 7
        },
        /// Programmable gain amplifier, selects the full-scale range
        pga @ 9..12 => Gain {
            /// ±6.144 V
            Fsr6_144 = 0,
            /// ±4.096 V
            Fsr4_096 = 1,
            /// ±2.048 V
            Fsr2_048 = 2,
            /// ±1.024 V
            Fsr1_024 = 3,
            /// ±0.512 V
            Fsr0_512 = 4,
            /// ±0.256 V
            Fsr0_256 = 5
        },
        /// Operating mode
        mode @ 8 => Mode {
            Continuous = 0,
            SingleShot = 1
        },
        /// Data rate
        dr @ 5..8 => DataRate {
            Sps8 = 0,
            Sps16 = 1,
            Sps32 = 2,
            Sps64 = 3,
            Sps128 = 4,
            Sps250 = 5,
            Sps475 = 6,
            Sps860 = 7
        },
        comp_mode @ 4 => ComparatorMode {
            Traditional = 0,
            Window = 1
        },
        /// Polarity of the ALERT/RDY pin
        comp_pol @ 3 => ComparatorPolarity {
            ActiveLow = 0,
            ActiveHigh = 1
        },
        comp_lat @ 2 => ComparatorLatch {
            NonLatching = 0,
            Latching = 1
        },
        comp_que @ 0..2 => ComparatorQueue {
            AssertAfterOne = 0,
            AssertAfterTwo = 1,
            AssertAfterFour = 2,
            Disabled = 3
        }
    }

    LoThresh(u16 @ 0x02, default = 0x8000) {}
    HiThresh(u16 @ 0x03, default = 0x7FFF) {}
}

impl Status {
    /// The value that starts a conversion when written in single-shot mode.
    pub const START: Self = Self::Ready;
}

impl Conversion {
    #[inline]
    pub fn sample(self) -> crate::Sample {
        crate::Sample::from_raw(self.bits())
    }
}

impl Config {
    /// The register with the status bit forced to a fixed value, so that a configuration that
    /// was written can be compared to one that was read back.
    #[inline]
    pub(crate) fn mask_off_status_bit(self) -> Self {
        self.os().write(Status::Ready)
    }
}

impl Gain {
    /// The full-scale range in volts. A code of `-32768` corresponds to `-fsr`.
    ///
    /// ```rust
    /// # use ads1115::Gain;
    /// assert_eq!(Gain::Fsr4_096.full_scale_range(), 4.096);
    /// assert_eq!(Gain::Fsr0_256.full_scale_range(), 0.256);
    /// ```
    #[inline]
    pub fn full_scale_range(self) -> f32 {
        match self {
            Gain::Fsr6_144 => 6.144,
            Gain::Fsr4_096 => 4.096,
            Gain::Fsr2_048 => 2.048,
            Gain::Fsr1_024 => 1.024,
            Gain::Fsr0_512 => 0.512,
            Gain::Fsr0_256 => 0.256,
        }
    }

    #[inline]
    pub fn volts_per_lsb(self) -> f32 {
        self.full_scale_range() / crate::Sample::FULL_SCALE_CODES
    }
}

impl DataRate {
    pub fn samples_per_second(self) -> u16 {
        match self {
            DataRate::Sps8 => 8,
            DataRate::Sps16 => 16,
            DataRate::Sps32 => 32,
            DataRate::Sps64 => 64,
            DataRate::Sps128 => 128,
            DataRate::Sps250 => 250,
            DataRate::Sps475 => 475,
            DataRate::Sps860 => 860,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const MASKS: [u16; 9] = [
        Status::MASK,
        InputMux::MASK,
        Gain::MASK,
        Mode::MASK,
        DataRate::MASK,
        ComparatorMode::MASK,
        ComparatorPolarity::MASK,
        ComparatorLatch::MASK,
        ComparatorQueue::MASK,
    ];

    #[test]
    fn pointer_addresses() {
        assert_eq!(Conversion::ADDRESS, 0x00);
        assert_eq!(Config::ADDRESS, 0x01);
        assert_eq!(LoThresh::ADDRESS, 0x02);
        assert_eq!(HiThresh::ADDRESS, 0x03);
    }

    #[test]
    fn field_masks_partition_the_register() {
        assert_eq!(Status::MASK, 0x8000);
        assert_eq!(InputMux::MASK, 0x7000);
        assert_eq!(Gain::MASK, 0x0E00);
        assert_eq!(Mode::MASK, 0x0100);
        assert_eq!(DataRate::MASK, 0x00E0);
        assert_eq!(ComparatorQueue::MASK, 0x0003);

        assert_eq!(MASKS.iter().fold(0u16, |acc, mask| acc | mask), 0xFFFF);
        for (i, a) in MASKS.iter().enumerate() {
            for b in &MASKS[i + 1..] {
                assert_eq!(a & b, 0, "{a:#06x} overlaps {b:#06x}");
            }
        }
    }

    #[test]
    fn field_values_are_encoded_in_place() {
        assert_eq!(u16::from(InputMux::Diff0_3), 0x1000);
        assert_eq!(u16::from(InputMux::Single3), 0x7000);
        assert_eq!(u16::from(Gain::Fsr4_096), 0x0200);
        assert_eq!(u16::from(Gain::Fsr0_256), 0x0A00);
        assert_eq!(u16::from(Mode::SingleShot), 0x0100);
        assert_eq!(u16::from(DataRate::Sps475), 0x00C0);
        assert_eq!(u16::from(DataRate::Sps860), 0x00E0);
        assert_eq!(u16::from(ComparatorQueue::Disabled), 0x0003);
    }

    #[test]
    fn setters_preserve_other_bits() {
        fn check<T>(write: impl Fn(Config, T) -> Config, read: impl Fn(Config) -> Option<T>)
        where
            T: FieldValue<u16> + PartialEq + core::fmt::Debug,
        {
            for start in [0x0000, 0xFFFF, 0x8583, 0x5A5A] {
                let before = Config::from_bits(start);
                for value in all_values::<T>() {
                    let after = write(before, value);
                    assert_eq!(read(after), Some(value));
                    assert_eq!(after.bits() & !T::MASK, before.bits() & !T::MASK);
                }
            }
        }

        fn all_values<T: FieldValue<u16>>() -> impl Iterator<Item = T> {
            (0..1u16 << T::WIDTH).filter_map(T::from_field_bits)
        }

        check::<InputMux>(|c, v| c.mux().write(v), |c| c.mux().read());
        check::<Gain>(|c, v| c.pga().write(v), |c| c.pga().read());
        check::<Mode>(|c, v| c.mode().write(v), |c| c.mode().read());
        check::<DataRate>(|c, v| c.dr().write(v), |c| c.dr().read());
        check::<Status>(|c, v| c.os().write(v), |c| c.os().read());
    }

    #[test]
    fn power_on_default_decodes() {
        let config = Config::default();

        assert_eq!(config.bits(), 34179);
        assert_eq!(config.os().read(), Some(Status::Ready));
        assert_eq!(config.mux().read(), Some(InputMux::Diff0_1));
        assert_eq!(config.pga().read(), Some(Gain::Fsr2_048));
        assert_eq!(config.mode().read(), Some(Mode::SingleShot));
        assert_eq!(config.dr().read(), Some(DataRate::Sps128));
        assert_eq!(config.comp_que().read(), Some(ComparatorQueue::Disabled));

        assert_eq!(config.os().write(Status::Busy).bits(), 1411);
    }

    #[test]
    fn busy_test_reads_only_the_status_bit() {
        // every bit except the status bit set
        let busy = Config::from_bits(0x7FFF);
        assert!(busy.os().is(Status::Busy));

        let ready = Config::from_bits(0x8000);
        assert!(!ready.os().is(Status::Busy));
    }

    #[test]
    fn reserved_gain_codes_are_invalid() {
        let config = Config::from_bits(0x0C00);
        assert_eq!(config.pga().read(), None);
        assert_eq!(
            config.pga().try_read(),
            Err(InvalidFieldValue {
                field: "pga",
                bits: 0x0C00
            })
        );
        assert!(Gain::try_from(0x0E00u16).is_err());
        assert!(InputMux::try_from(0x1001u16).is_err());
    }

    #[test]
    fn full_scale_ranges() {
        let expected = [6.144, 4.096, 2.048, 1.024, 0.512, 0.256];
        for (gain, fsr) in Gain::all().zip(expected) {
            assert_eq!(gain.full_scale_range(), fsr);
            assert_eq!(gain.volts_per_lsb(), fsr / 32768.0);
        }
        assert_eq!(Gain::all().count(), 6);
    }

    #[test]
    fn data_rates() {
        let rates: [u16; 8] = [8, 16, 32, 64, 128, 250, 475, 860];
        assert!(DataRate::all().map(DataRate::samples_per_second).eq(rates));
    }
}
