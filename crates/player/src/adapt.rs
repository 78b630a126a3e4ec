// Channel remixing and sample rate conversion between track and device

/// Streaming converter from the track layout to the output device layout
///
/// Rate conversion is linear interpolation; the last input frame of each
/// chunk is carried over so chunk boundaries stay continuous.
pub(crate) struct SampleAdapter {
    in_channels: usize,
    out_channels: usize,
    step: f64,
    position: f64,
    history: Vec<f32>,
}

impl SampleAdapter {
    pub(crate) fn new(in_rate: u32, in_channels: u16, out_rate: u32, out_channels: u16) -> Self {
        Self {
            in_channels: in_channels.max(1) as usize,
            out_channels: out_channels.max(1) as usize,
            step: in_rate.max(1) as f64 / out_rate.max(1) as f64,
            position: 0.0,
            history: Vec::new(),
        }
    }

    pub(crate) fn is_passthrough(&self) -> bool {
        self.in_channels == self.out_channels && self.step == 1.0
    }

    /// Forget carried state, e.g. after a seek
    pub(crate) fn reset(&mut self) {
        self.position = 0.0;
        self.history.clear();
    }

    pub(crate) fn process(&mut self, input: &[f32]) -> Vec<f32> {
        if self.is_passthrough() {
            return input.to_vec();
        }
        let remixed = self.remix(input);
        if self.step == 1.0 {
            return remixed;
        }
        self.resample(remixed)
    }

    fn remix(&self, input: &[f32]) -> Vec<f32> {
        let (inc, outc) = (self.in_channels, self.out_channels);
        if inc == outc {
            return input.to_vec();
        }

        let frames = input.len() / inc;
        let mut output = Vec::with_capacity(frames * outc);
        for frame in input.chunks_exact(inc) {
            if outc == 1 {
                output.push(frame.iter().sum::<f32>() / inc as f32);
            } else if inc == 1 {
                output.extend(std::iter::repeat(frame[0]).take(outc));
            } else {
                output.extend((0..outc).map(|ch| frame[ch % inc]));
            }
        }
        output
    }

    fn resample(&mut self, remixed: Vec<f32>) -> Vec<f32> {
        let ch = self.out_channels;
        let mut frames = std::mem::take(&mut self.history);
        frames.extend_from_slice(&remixed);

        let total = frames.len() / ch;
        if total < 2 {
            self.history = frames;
            return Vec::new();
        }

        let last = (total - 1) as f64;
        let mut output = Vec::with_capacity(((last - self.position) / self.step) as usize * ch + ch);
        let mut t = self.position;
        while t < last {
            let idx = t as usize;
            let frac = (t - idx as f64) as f32;
            for c in 0..ch {
                let a = frames[idx * ch + c];
                let b = frames[(idx + 1) * ch + c];
                output.push(a + (b - a) * frac);
            }
            t += self.step;
        }

        self.position = t - last;
        self.history = frames[(total - 1) * ch..].to_vec();
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough() {
        let mut adapter = SampleAdapter::new(44_100, 2, 44_100, 2);
        assert!(adapter.is_passthrough());
        assert_eq!(adapter.process(&[0.1, 0.2, 0.3, 0.4]), vec![0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_mono_to_stereo() {
        let mut adapter = SampleAdapter::new(48_000, 1, 48_000, 2);
        assert_eq!(adapter.process(&[0.5, -0.5]), vec![0.5, 0.5, -0.5, -0.5]);
    }

    #[test]
    fn test_stereo_to_mono_averages() {
        let mut adapter = SampleAdapter::new(48_000, 2, 48_000, 1);
        assert_eq!(adapter.process(&[1.0, 0.0, 0.5, 0.5]), vec![0.5, 0.5]);
    }

    #[test]
    fn test_upsampling_is_continuous_across_chunks() {
        let mut adapter = SampleAdapter::new(1, 1, 2, 1);
        let mut out = adapter.process(&[0.0, 1.0]);
        out.extend(adapter.process(&[2.0, 3.0]));
        assert_eq!(out, vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5]);
    }

    #[test]
    fn test_downsampling_halves_frames() {
        let mut adapter = SampleAdapter::new(2, 1, 1, 1);
        let input: Vec<f32> = (0..9).map(|i| i as f32).collect();
        assert_eq!(adapter.process(&input), vec![0.0, 2.0, 4.0, 6.0]);
    }
}
