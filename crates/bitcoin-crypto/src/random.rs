// bitcoin-crypto/src/random.rs

//! Hardened random byte generation.
//!
//! Every call runs the same pipeline on freshly built generators:
//!
//! 1. **plan** - a coarse SHA-256 generator, seeded from clocks and the core
//!    count plus a few bytes of OS entropy, makes the small random choices
//!    the later stages need.
//! 2. **harden** - collect a byte derived from the core count, the UTC
//!    timestamp, a monotonic tick, OS entropy and scheduler jitter.
//! 3. **compress** - SHA-512, truncate to the planned length, SHA-512 again.
//! 4. **stretch** - XOR-fold the seed through repeated SHA-512 passes so that
//!    reconstructing it by brute force is expensive, GPUs included.
//! 5. **finalize** - seed a SHA-512 generator with the result, reseed it once
//!    from itself and emit the requested bytes.
//!
//! Stretching is CPU-bound and blocks; async callers should run it on a
//! blocking thread.

use crate::config::RandomConfig;
use crate::hash::{sha512, HASH512_SIZE};
use crate::{CryptoError, CryptoResult};
use chrono::Utc;
use rand::rngs::OsRng;
use rand::Rng;
use rand_core::{impls, CryptoRng, RngCore};
use sha2::{Digest, Sha256, Sha512};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

/// Bytes of OS entropy folded into the hardening buffer
const OS_ENTROPY_BYTES: usize = 32;

/// Generate `size` random bytes with the default configuration
pub fn random_bytes(size: usize) -> CryptoResult<Vec<u8>> {
    SecureRandom::default().random_bytes(size)
}

/// Generate `size` random bytes with a custom stretching count. Negative
/// counts are treated as 0, which skips stretching.
pub fn random_bytes_with_stretching(size: usize, seed_stretching: i64) -> CryptoResult<Vec<u8>> {
    SecureRandom::new(RandomConfig::with_seed_stretching(seed_stretching)).random_bytes(size)
}

/// Random byte source with a stretched, multi-source seed
#[derive(Debug, Clone, Default)]
pub struct SecureRandom {
    config: RandomConfig,
}

impl SecureRandom {
    pub fn new(config: RandomConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RandomConfig {
        &self.config
    }

    /// Produce exactly `size` bytes
    pub fn random_bytes(&self, size: usize) -> CryptoResult<Vec<u8>> {
        let plan = SeedPlan::draw(self.config.stretching_rounds())?;
        let hardening = harden(&plan, self.config.jitter_bytes)?;
        let compressed = compress(&hardening, plan.truncate_to);
        let stretched = stretch(compressed, plan.stretch_iterations);
        Ok(finalize(&stretched, size))
    }
}

/// Random choices made up front by the coarse generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPlan {
    /// Leading byte of the hardening buffer
    pub core_byte: u8,
    /// How much of the first SHA-512 output survives compression, in `[16, 64)`
    pub truncate_to: usize,
    /// `rounds - rand[0, rounds / 9)` SHA-512 passes
    pub stretch_iterations: u64,
}

impl SeedPlan {
    pub fn draw(rounds: u64) -> CryptoResult<Self> {
        let mut coarse = coarse_generator()?;
        Ok(Self::draw_from(&mut coarse, rounds, num_cpus::get()))
    }

    fn draw_from<R: RngCore>(coarse: &mut R, rounds: u64, cores: usize) -> Self {
        let cores = cores.max(1);
        let span = cores - 1;
        let pick = if span == 0 { 0 } else { coarse.gen_range(0..span) };
        let core_byte = (cores - pick) as u8;

        let truncate_to = coarse.gen_range(16..HASH512_SIZE);

        let discount_limit = rounds / 9;
        let discount = if discount_limit == 0 {
            0
        } else {
            coarse.gen_range(0..discount_limit)
        };

        Self {
            core_byte,
            truncate_to,
            stretch_iterations: rounds - discount,
        }
    }
}

/// Stage 1: SHA-256 generator seeded from timing data, topped up with a few
/// bytes of OS entropy
fn coarse_generator() -> CryptoResult<DigestRng<Sha256>> {
    coarse_generator_from(timing_seed())
}

/// Build the coarse generator from a timing seed, or from the wall clock
/// when there is none
fn coarse_generator_from(timing: Option<i64>) -> CryptoResult<DigestRng<Sha256>> {
    let seed = timing.unwrap_or_else(|| {
        tracing::warn!("Timing seed unavailable, falling back to wall clock seed");
        fallback_seed()
    });
    let mut coarse = DigestRng::<Sha256>::new(&seed.to_le_bytes());

    let mut extra = vec![0u8; 1 + coarse.gen_range(0..32)];
    OsRng
        .try_fill_bytes(&mut extra)
        .map_err(|e| CryptoError::RngError(e.to_string()))?;
    coarse.add_seed_material(&extra);
    Ok(coarse)
}

/// Wall clock plus core count minus the monotonic tick. `None` if a clock is
/// out of range or the arithmetic overflows.
fn timing_seed() -> Option<i64> {
    let now = Utc::now().timestamp_nanos_opt()?;
    let cores = i64::try_from(num_cpus::get()).ok()?;
    let tick = i64::try_from(monotonic_ticks()).ok()?;
    now.checked_add(cores)?.checked_sub(tick)
}

fn fallback_seed() -> i64 {
    Utc::now().timestamp_micros()
}

/// Nanoseconds since the first call in this process
fn monotonic_ticks() -> u64 {
    static START: OnceLock<Instant> = OnceLock::new();
    let elapsed = START.get_or_init(Instant::now).elapsed();
    u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX)
}

/// Stage 2: concatenate the hardening sources
fn harden(plan: &SeedPlan, jitter_bytes: usize) -> CryptoResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(1 + 8 + 8 + OS_ENTROPY_BYTES + jitter_bytes);
    buf.push(plan.core_byte);

    let timestamp = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(fallback_seed);
    buf.extend_from_slice(&timestamp.to_le_bytes());
    buf.extend_from_slice(&monotonic_ticks().to_le_bytes());

    let mut os_entropy = [0u8; OS_ENTROPY_BYTES];
    OsRng
        .try_fill_bytes(&mut os_entropy)
        .map_err(|e| CryptoError::RngError(e.to_string()))?;
    buf.extend_from_slice(&os_entropy);

    buf.extend_from_slice(&collect_jitter(jitter_bytes)?);
    Ok(buf)
}

/// Sample scheduler jitter: a spinning thread counts while this thread
/// sleeps, and the low bits of each count become one byte.
pub fn collect_jitter(len: usize) -> CryptoResult<Vec<u8>> {
    if len == 0 {
        return Ok(Vec::new());
    }

    let counter = Arc::new(AtomicU32::new(0));
    let stop = Arc::new(AtomicBool::new(false));
    let handle = {
        let counter = Arc::clone(&counter);
        let stop = Arc::clone(&stop);
        thread::Builder::new()
            .name("jitter-seed".into())
            .spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            })
            .map_err(|e| CryptoError::RngError(format!("jitter thread: {}", e)))?
    };

    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        thread::sleep(Duration::from_millis(1));
        let count = counter.swap(0, Ordering::Relaxed);
        if count != 0 {
            out.push((count ^ (count >> 8)) as u8);
        }
    }

    stop.store(true, Ordering::Relaxed);
    handle
        .join()
        .map_err(|_| CryptoError::RngError("jitter thread panicked".into()))?;
    Ok(out)
}

/// Stage 3: SHA-512, keep `truncate_to` bytes, SHA-512 back up to 64 bytes
pub fn compress(material: &[u8], truncate_to: usize) -> [u8; HASH512_SIZE] {
    let first = sha512(material);
    let keep = truncate_to.min(HASH512_SIZE);
    sha512(&first.as_bytes()[..keep]).to_bytes()
}

/// Stage 4: XOR each SHA-512 pass back into the running seed
pub fn stretch(mut seed: [u8; HASH512_SIZE], iterations: u64) -> [u8; HASH512_SIZE] {
    if iterations == 0 {
        return seed;
    }
    tracing::trace!("Stretching seed over {} SHA-512 passes", iterations);
    for _ in 0..iterations {
        let pass = sha512(&seed);
        seed.iter_mut()
            .zip(pass.as_bytes())
            .for_each(|(s, p)| *s ^= p);
    }
    seed
}

/// Stage 5: expand the stretched seed into `size` bytes
fn finalize(seed: &[u8; HASH512_SIZE], size: usize) -> Vec<u8> {
    let mut rng = DigestRng::<Sha512>::new(seed);
    let mut reseed = vec![0u8; 1 + rng.gen_range(0..HASH512_SIZE)];
    rng.fill_bytes(&mut reseed);
    rng.add_seed_material(&reseed);

    let mut output = vec![0u8; size];
    rng.fill_bytes(&mut output);
    output
}

/// Deterministic generator built from a hash function. Each output block is
/// `H(counter || state || seed)`; seed material is chained into `seed`.
pub struct DigestRng<D: Digest> {
    seed: Vec<u8>,
    state: Vec<u8>,
    counter: u64,
    block: Vec<u8>,
    pos: usize,
    _digest: PhantomData<D>,
}

impl<D: Digest> DigestRng<D> {
    pub fn new(seed_material: &[u8]) -> Self {
        let seed = D::digest(seed_material).to_vec();
        let state = D::digest(&seed).to_vec();
        Self {
            seed,
            state,
            counter: 0,
            block: Vec::new(),
            pos: 0,
            _digest: PhantomData,
        }
    }

    /// Mix more material into the seed. Buffered output is discarded.
    pub fn add_seed_material(&mut self, material: &[u8]) {
        self.seed = D::new()
            .chain_update(material)
            .chain_update(&self.seed)
            .finalize()
            .to_vec();
        self.block.clear();
        self.pos = 0;
    }

    fn next_block(&mut self) {
        self.counter = self.counter.wrapping_add(1);
        self.state = D::new()
            .chain_update(self.counter.to_le_bytes())
            .chain_update(&self.state)
            .chain_update(&self.seed)
            .finalize()
            .to_vec();
        self.block.clone_from(&self.state);
        self.pos = 0;
    }
}

impl<D: Digest> RngCore for DigestRng<D> {
    fn next_u32(&mut self) -> u32 {
        impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut written = 0;
        while written < dest.len() {
            if self.pos >= self.block.len() {
                self.next_block();
            }
            let take = (self.block.len() - self.pos).min(dest.len() - written);
            dest[written..written + take].copy_from_slice(&self.block[self.pos..self.pos + take]);
            self.pos += take;
            written += take;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for DigestRng<Sha512> {}
