use anyhow::{ensure, Context, Result};
use bytepipe::{FrameReader, FrameWriter};
use clap::Parser;
use codec::DeltaCompressor;
use demo_state::{PlayerState, StateCodec, TickCodec, TickContext};
use tracing::{debug, info};

type Engine = DeltaCompressor<StateCodec, TickCodec>;

#[derive(Parser)]
#[command(
    name = "demo-sim",
    version,
    about = "Deterministic delta-sync demo over an in-process stream"
)]
struct Cli {
    /// Number of simulated players.
    #[arg(long, default_value_t = 16)]
    players: usize,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 300)]
    ticks: u32,
    /// RNG seed for deterministic results.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Probability a player holds still this tick.
    #[arg(long, default_value_t = 0.8)]
    idle_ratio: f32,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    ensure!(cli.players > 0, "--players must be at least 1");
    ensure!(cli.ticks > 0, "--ticks must be at least 1");

    let snapshots = simulate(&cli);
    let initial = vec![PlayerState::default(); cli.players];

    let (sink, source) = tokio::io::duplex(64 * 1024);

    let sender_snapshots = snapshots.clone();
    let sender_initial = initial.clone();
    let players = cli.players;
    let sender = tokio::spawn(async move {
        let mut engine = Engine::new(players)?;
        engine.set_initial_state(&sender_initial)?;
        let mut writer = FrameWriter::new(sink);
        for (step, snapshot) in sender_snapshots.iter().enumerate() {
            let ctx = TickContext {
                tick: step as u64 + 1,
            };
            engine.write_packet(&mut writer, snapshot, &ctx).await?;
            debug!(tick = ctx.tick, flushed = writer.flushed(), "packet sent");
        }
        // Dropping the writer closes the duplex and completes the receiver.
        anyhow::Ok(writer.flushed())
    });

    let mut receiver = Engine::new(cli.players)?;
    receiver.set_initial_state(&initial)?;
    let mut reader = FrameReader::new(source);
    receiver
        .apply_packet(&mut reader)
        .await
        .context("receiver failed to apply the stream")?;

    let delta_bytes = sender.await.context("sender task panicked")??;

    let last = snapshots.last().context("no snapshots were simulated")?;
    ensure!(
        receiver.current_state() == &last[..],
        "receiver diverged from sender after {} ticks",
        cli.ticks
    );

    let packets = u64::from(cli.ticks);
    let raw_bytes = packets * (cli.players as u64 * 6 + 12);
    info!(players = cli.players, ticks = cli.ticks, "receiver converged");

    println!("players:      {}", cli.players);
    println!("ticks:        {}", cli.ticks);
    println!("seed:         {}", cli.seed);
    println!(
        "delta bytes:  {} total, {:.1} avg/packet",
        delta_bytes,
        delta_bytes as f64 / packets as f64
    );
    println!(
        "raw bytes:    {} total ({:.1}x reduction)",
        raw_bytes,
        raw_bytes as f64 / delta_bytes as f64
    );

    Ok(())
}

/// Runs the deterministic random walk and returns one snapshot per tick.
fn simulate(cli: &Cli) -> Vec<Vec<PlayerState>> {
    let mut rng = Rng::new(cli.seed);
    let mut players = vec![PlayerState::default(); cli.players];
    let mut snapshots = Vec::with_capacity(cli.ticks as usize);

    for tick in 1..=u64::from(cli.ticks) {
        for player in &mut players {
            player.tick = tick;
            if rng.unit_f32() < cli.idle_ratio {
                continue;
            }
            let step = rng.range_i64(-50, 50) as i32;
            player.position_q = player.position_q.saturating_add(step);
            if rng.unit_f32() < 0.1 {
                player.ammo = if player.ammo == 0 { 30 } else { player.ammo - 1 };
            }
        }
        snapshots.push(players.clone());
    }
    snapshots
}

struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    fn unit_f32(&mut self) -> f32 {
        self.next_u32() as f32 / u32::MAX as f32
    }

    fn range_i64(&mut self, min: i64, max: i64) -> i64 {
        let span = (max - min).unsigned_abs().max(1) + 1;
        let value = u64::from(self.next_u32()) % span;
        min + value as i64
    }
}
