use std::{thread, time::Duration};

use ads1115::{Address, Ads1115, DataRate, Gain, InputMux, Mode, PollLimit};
use anyhow::{anyhow, Result as AnyResult};
use rppal::i2c::I2c;

const SAMPLE_PERIOD: Duration = Duration::from_millis(200);

fn main() -> AnyResult<()> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()?;

    let i2c = I2c::new()?;
    log::info!("Opened I2C bus {}", i2c.bus());

    let mut adc = Ads1115::new(i2c, Address::Gnd)
        .map_err(|e| anyhow!("failed to initialize the ADC: {e:?}"))?
        .with_poll_limit(PollLimit::Attempts(1_000));

    adc.set_input_mux(InputMux::Single0);
    adc.set_gain(Gain::Fsr4_096);
    adc.set_mode(Mode::SingleShot);
    adc.set_data_rate(DataRate::Sps128);
    adc.commit_verified().map_err(|e| anyhow!("failed to configure the ADC: {e:?}"))?;

    log::info!(
        "Sampling AIN0 at {} SPS, ±{} V range",
        DataRate::Sps128.samples_per_second(),
        Gain::Fsr4_096.full_scale_range()
    );

    loop {
        let sample = adc
            .read_sample()
            .map_err(|e| anyhow!("conversion failed: {e:?}"))?;
        let volts = adc
            .to_volts(sample)
            .map_err(|e| anyhow!("bad gain setting: {e:?}"))?;

        println!("{:6} -> {volts:.4} V", sample.raw());

        thread::sleep(SAMPLE_PERIOD);
    }
}
