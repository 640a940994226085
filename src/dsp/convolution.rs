/*
Convolution Reverb
==================

The reverb is a convolution with a synthetic impulse response: white noise
shaped by a steep decay,

    h[i] = (u*2 - 1) * (1 - i/len)^10      u uniform in [0, 1)

which sounds like a diffuse room tail with no distinct echoes. Impulses run
up to three seconds, i.e. ~144k taps at 48 kHz, far too many for direct
convolution. Instead we use uniformly partitioned overlap-add in the
frequency domain:

    impulse  ──split──→  [h0][h1][h2] ... [hP-1]       (B taps each)
                          │   │   │         │
                          FFT (size 2B, zero padded), computed once

    input blocks x_m (B samples)
      FFT → X_m, pushed into a frequency-domain delay line

    Y_m = Σ_p  X_{m-p} · H_p            (complex multiply-accumulate)
    y_m = IFFT(Y_m);   output first B + overlap;  keep last B as overlap

Cost per sample is O(P) multiply-adds plus two FFTs per block, instead of
O(P·B).

Latency
-------

Input is gathered a full block before it is transformed, so the wet
output is delayed by exactly B samples (1024 ≈ 21 ms at 48 kHz). Under a
reverb tail that reads as a little pre-delay.

Normalization
-------------

The impulse is scaled to unit energy (Σ h² = 1), so the wet path has
roughly the loudness of the dry path whatever the tail length.

Sharing
-------

Partition spectra live in an `ImpulseSpectrum` behind an `Arc`, so every
note of one instrument can reuse a single impulse. Each `Convolver` owns
only its streaming state, allocated in full when it is constructed: one
spectrum per partition for the input history. Building a chain therefore
costs memory up front, and rendering never allocates.
*/

use std::sync::Arc;

use rand::Rng;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Partition length in samples; also the wet-path latency.
pub const PARTITION_SIZE: usize = 1024;
/// Longest impulse we generate, in seconds.
pub const MAX_IMPULSE_SECONDS: f32 = 3.0;
/// Exponent of the `(1 - i/len)` decay curve.
pub const DECAY_EXPONENT: i32 = 10;

/// Exponentially decaying noise, `min(seconds, 3) * sample_rate` taps long,
/// normalized to unit energy.
pub fn decaying_noise_impulse<R: Rng + ?Sized>(rng: &mut R, sample_rate: f32, seconds: f32) -> Vec<f32> {
    let seconds = seconds.clamp(0.0, MAX_IMPULSE_SECONDS);
    let len = ((sample_rate * seconds) as usize).max(1);

    let mut impulse: Vec<f32> = (0..len)
        .map(|i| {
            let u: f32 = rng.gen();
            (u * 2.0 - 1.0) * (1.0 - i as f32 / len as f32).powi(DECAY_EXPONENT)
        })
        .collect();

    let energy: f32 = impulse.iter().map(|h| h * h).sum();
    if energy > f32::EPSILON {
        let scale = energy.sqrt().recip();
        impulse.iter_mut().for_each(|h| *h *= scale);
    }
    impulse
}

/// Frequency-domain partitions of one impulse response, with the FFT plans
/// that produced them. Immutable once built and shared between convolvers.
pub struct ImpulseSpectrum {
    block: usize,
    fft: Arc<dyn Fft<f32>>,
    ifft: Arc<dyn Fft<f32>>,
    partitions: Vec<Vec<Complex<f32>>>,
    impulse_len: usize,
}

impl ImpulseSpectrum {
    pub fn new(impulse: &[f32]) -> Self {
        Self::with_partition_size(impulse, PARTITION_SIZE)
    }

    pub fn with_partition_size(impulse: &[f32], block: usize) -> Self {
        let block = block.max(1);
        let size = 2 * block;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);
        let mut scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        let partitions = impulse
            .chunks(block)
            .map(|taps| {
                let mut spectrum = vec![Complex::new(0.0, 0.0); size];
                for (bin, &tap) in spectrum.iter_mut().zip(taps) {
                    *bin = Complex::new(tap, 0.0);
                }
                fft.process_with_scratch(&mut spectrum, &mut scratch);
                spectrum
            })
            .collect();

        Self {
            block,
            fft,
            ifft,
            partitions,
            impulse_len: impulse.len(),
        }
    }

    pub fn partition_size(&self) -> usize {
        self.block
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    pub fn impulse_len(&self) -> usize {
        self.impulse_len
    }
}

/// Streaming partitioned convolver. `process` never allocates.
pub struct Convolver {
    impulse: Arc<ImpulseSpectrum>,
    /// Spectra of past input blocks, `2 * block` bins per slot, newest slot
    /// at `history_pos`.
    history: Vec<Complex<f32>>,
    history_pos: usize,
    /// Set by the first block carrying signal. Until then blocks are skipped.
    heard: bool,
    input: Vec<f32>,
    output: Vec<f32>,
    overlap: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    accum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    pos: usize,
}

impl Convolver {
    pub fn from_spectrum(impulse: Arc<ImpulseSpectrum>) -> Self {
        let block = impulse.block;
        let size = 2 * block;
        let scratch_len = impulse
            .fft
            .get_inplace_scratch_len()
            .max(impulse.ifft.get_inplace_scratch_len());
        let zero = Complex::new(0.0, 0.0);
        let slots = impulse.partitions.len().max(1);

        Self {
            impulse,
            history: vec![zero; slots * size],
            history_pos: 0,
            heard: false,
            input: vec![0.0; block],
            output: vec![0.0; block],
            overlap: vec![0.0; block],
            spectrum: vec![zero; size],
            accum: vec![zero; size],
            scratch: vec![zero; scratch_len],
            pos: 0,
        }
    }

    /// Wet-path delay in samples.
    pub fn latency(&self) -> usize {
        self.impulse.block
    }

    /// Samples of output that can follow the last non-zero input.
    pub fn tail_len(&self) -> usize {
        self.impulse.impulse_len + self.impulse.block
    }

    #[inline]
    pub fn process_sample(&mut self, x: f32) -> f32 {
        let y = self.output[self.pos];
        self.input[self.pos] = x;
        self.pos += 1;
        if self.pos == self.input.len() {
            self.convolve_block();
            self.pos = 0;
        }
        y
    }

    /// Replace `buffer` with its wet signal.
    pub fn process(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    fn convolve_block(&mut self) {
        let zero = Complex::new(0.0, 0.0);
        let h = Arc::clone(&self.impulse);
        let block = h.block;

        let size = 2 * block;

        if !self.heard {
            // Nothing heard yet: silence in, silence out.
            if self.input.iter().all(|&x| x == 0.0) {
                self.output.fill(0.0);
                return;
            }
            self.heard = true;
        }

        for (bin, &x) in self.spectrum.iter_mut().zip(&self.input) {
            *bin = Complex::new(x, 0.0);
        }
        self.spectrum[block..].fill(zero);
        h.fft.process_with_scratch(&mut self.spectrum, &mut self.scratch);
        let newest = self.history_pos * size;
        self.history[newest..newest + size].copy_from_slice(&self.spectrum);

        self.accum.fill(zero);
        let slots = self.history.len() / size;
        for (p, partition) in h.partitions.iter().enumerate() {
            let slot = (self.history_pos + slots - p) % slots;
            let past = &self.history[slot * size..(slot + 1) * size];
            for ((acc, x), hp) in self.accum.iter_mut().zip(past).zip(partition) {
                *acc += x * hp;
            }
        }
        self.history_pos = (self.history_pos + 1) % slots;

        h.ifft.process_with_scratch(&mut self.accum, &mut self.scratch);
        let norm = 1.0 / (2 * block) as f32;
        for i in 0..block {
            self.output[i] = self.accum[i].re * norm + self.overlap[i];
            self.overlap[i] = self.accum[block + i].re * norm;
        }
    }

    /// Whether any non-silent block has been convolved yet.
    pub fn has_heard_signal(&self) -> bool {
        self.heard
    }

    pub fn reset(&mut self) {
        self.history.fill(Complex::new(0.0, 0.0));
        self.heard = false;
        self.input.fill(0.0);
        self.output.fill(0.0);
        self.overlap.fill(0.0);
        self.pos = 0;
        self.history_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn convolver(impulse: &[f32], block: usize) -> Convolver {
        Convolver::from_spectrum(Arc::new(ImpulseSpectrum::with_partition_size(impulse, block)))
    }

    fn direct(input: &[f32], impulse: &[f32]) -> Vec<f32> {
        let mut out = vec![0.0; input.len() + impulse.len()];
        for (i, &x) in input.iter().enumerate() {
            for (j, &h) in impulse.iter().enumerate() {
                out[i + j] += x * h;
            }
        }
        out
    }

    #[test]
    fn matches_direct_convolution_after_latency() {
        let mut rng = StdRng::seed_from_u64(5);
        let impulse: Vec<f32> = (0..300).map(|_| rng.gen::<f32>() - 0.5).collect();
        let input: Vec<f32> = (0..500).map(|_| rng.gen::<f32>() - 0.5).collect();

        let block = 64;
        let mut convolver = convolver(&impulse, block);
        let mut stream = input.clone();
        stream.resize(input.len() + impulse.len() + block, 0.0);
        convolver.process(&mut stream);

        let expected = direct(&input, &impulse);
        for (n, want) in expected.iter().enumerate() {
            let got = stream[n + block];
            assert!((got - want).abs() < 1e-3, "sample {n}: {got} vs {want}");
        }
    }

    #[test]
    fn unit_impulse_is_a_pure_delay() {
        let mut convolver = convolver(&[1.0], 16);
        let mut stream = vec![0.0f32; 48];
        stream[3] = 1.0;
        convolver.process(&mut stream);
        assert!((stream[3 + 16] - 1.0).abs() < 1e-5);
        assert_eq!(convolver.latency(), 16);
    }

    #[test]
    fn impulse_length_is_capped_and_energy_normalized() {
        let mut rng = StdRng::seed_from_u64(9);
        let impulse = decaying_noise_impulse(&mut rng, 1_000.0, 10.0);
        assert_eq!(impulse.len(), 3_000);

        let energy: f32 = impulse.iter().map(|h| h * h).sum();
        assert!((energy - 1.0).abs() < 1e-3);
    }

    #[test]
    fn impulse_decays() {
        let mut rng = StdRng::seed_from_u64(2);
        let impulse = decaying_noise_impulse(&mut rng, 8_000.0, 1.0);
        let head: f32 = impulse[..800].iter().map(|h| h.abs()).sum();
        let tail: f32 = impulse[7_200..].iter().map(|h| h.abs()).sum();
        assert!(head > tail * 100.0);
    }

    #[test]
    fn silence_skips_the_transform() {
        let mut rng = StdRng::seed_from_u64(3);
        let impulse = decaying_noise_impulse(&mut rng, 8_000.0, 0.5);
        let mut convolver = Convolver::from_spectrum(Arc::new(ImpulseSpectrum::new(&impulse)));
        let mut buffer = vec![0.0f32; 4096];
        convolver.process(&mut buffer);
        assert!(buffer.iter().all(|&s| s == 0.0));
        assert!(!convolver.has_heard_signal());

        buffer[0] = 1.0;
        convolver.process(&mut buffer);
        assert!(convolver.has_heard_signal());
    }

    #[test]
    fn history_is_allocated_before_the_first_block() {
        let mut rng = StdRng::seed_from_u64(4);
        let impulse = decaying_noise_impulse(&mut rng, 8_000.0, 1.0);
        let spectrum = Arc::new(ImpulseSpectrum::with_partition_size(&impulse, 256));
        let mut convolver = Convolver::from_spectrum(Arc::clone(&spectrum));

        assert_eq!(convolver.history.len(), spectrum.partition_count() * 2 * 256);
        let before = (convolver.history.as_ptr(), convolver.history.capacity());

        let mut buffer: Vec<f32> = (0..2048).map(|i| (i as f32 * 0.01).sin()).collect();
        convolver.process(&mut buffer);
        assert!(convolver.has_heard_signal());
        assert_eq!((convolver.history.as_ptr(), convolver.history.capacity()), before);
    }

    #[test]
    fn spectra_can_be_shared() {
        let spectrum = Arc::new(ImpulseSpectrum::with_partition_size(&[0.0, 1.0], 4));
        assert_eq!(spectrum.partition_count(), 1);

        let mut a = Convolver::from_spectrum(Arc::clone(&spectrum));
        let mut b = Convolver::from_spectrum(spectrum);
        let mut x = vec![0.0f32; 12];
        x[0] = 1.0;
        let mut y = x.clone();
        a.process(&mut x);
        b.process(&mut y);
        assert_eq!(x, y);
        assert!((x[5] - 1.0).abs() < 1e-5);
    }
}
