use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};
use hound::{SampleFormat, WavSpec, WavWriter};

use echopay_core::device::BufferedCapture;
use echopay_core::{Authenticator, Encoder, Listener, Packet, SAMPLE_RATE};

#[derive(Parser)]
#[command(name = "echopay")]
#[command(about = "Sound-based payment link: authenticated packets over FSK audio")]
struct Cli {
    /// Shared secret for packet signing and verification
    #[arg(long, global = true, default_value = "ECHOPAY_DEMO_SECRET")]
    secret: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build, sign, and encode a payment packet to a WAV audio file
    Send {
        /// Sender account id
        #[arg(long)]
        sender_id: u32,

        /// Amount in minor currency units (paise)
        #[arg(long)]
        amount_paise: u32,

        /// Output WAV file
        #[arg(value_name = "OUTPUT.WAV")]
        output: PathBuf,
    },

    /// Decode a WAV audio file and validate the recovered packet
    Recv {
        /// Input WAV file
        #[arg(value_name = "INPUT.WAV")]
        input: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let auth = Authenticator::new(cli.secret.as_bytes());

    match cli.command {
        Commands::Send {
            sender_id,
            amount_paise,
            output,
        } => send_command(&auth, sender_id, amount_paise, &output)?,
        Commands::Recv { input } => recv_command(&auth, &input)?,
    }

    Ok(())
}

fn send_command(
    auth: &Authenticator,
    sender_id: u32,
    amount_paise: u32,
    output_path: &PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let timestamp_sec = epoch_seconds()?;
    let nonce: u16 = rand::random();

    let packet = auth.sign_packet(sender_id, amount_paise, timestamp_sec, nonce);
    let encoder = Encoder::new();
    let samples = encoder.encode_packet(&packet);
    println!(
        "Packet (sender {}, {} paise, nonce {}) rendered to {} audio samples",
        sender_id,
        amount_paise,
        nonce,
        samples.len()
    );

    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE as u32,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(output_path, spec)?;
    for sample in samples {
        let clamped = (sample * i16::MAX as f32).clamp(i16::MIN as f32, i16::MAX as f32);
        writer.write_sample(clamped as i16)?;
    }
    writer.finalize()?;
    println!("Wrote {}", output_path.display());
    Ok(())
}

fn recv_command(auth: &Authenticator, input_path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = hound::WavReader::open(input_path)?;
    let samples: Vec<f32> = match reader.spec().sample_format {
        SampleFormat::Int => reader
            .samples::<i16>()
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|s| s as f32 / i16::MAX as f32)
            .collect(),
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
    };
    println!("Read {} samples from {}", samples.len(), input_path.display());

    let encoder = Encoder::new();
    let capture = BufferedCapture::new(samples, &encoder.config());
    let mut listener = Listener::new();

    let Some(candidate) = listener.run(capture)? else {
        return Err("no packet found in audio".into());
    };

    let packet = Packet::decode(&candidate)?;
    auth.validate(&packet, epoch_seconds()?)?;

    println!("Packet accepted:");
    println!("  sender_id:     {}", packet.sender_id);
    println!("  amount_paise:  {}", packet.amount_paise);
    println!("  timestamp_sec: {}", packet.timestamp_sec);
    println!("  nonce:         {}", packet.nonce);
    Ok(())
}

fn epoch_seconds() -> Result<u32, Box<dyn std::error::Error>> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?;
    Ok(now.as_secs() as u32)
}
