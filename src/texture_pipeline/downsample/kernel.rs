use std::ops::Range;

use crate::texture_pipeline::downsample::types::Filter;
use crate::texture_pipeline::volume::{Sample, Shape};

/// Running statistics over one block. `f64` keeps u16 sums exact.
struct BlockAccumulator {
    min: f64,
    max: f64,
    sum: f64,
    count: usize,
}

impl BlockAccumulator {
    fn new() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
            count: 0,
        }
    }

    fn push(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
        self.count += 1;
    }

    fn finish(&self, filter: Filter) -> f64 {
        let mean = self.sum / self.count as f64;
        match filter {
            Filter::Minimum => self.min,
            Filter::Maximum => self.max,
            Filter::Mean => mean,
            Filter::Blended { weight } => mean + weight * (self.max - mean),
        }
    }
}

/// Source indices feeding output index `out` along one axis.
///
/// Bins are pairs; the last bin absorbs whatever remains, so it holds one
/// sample when the output was rounded up and three when rounded down.
fn bin(out: usize, out_len: usize, in_len: usize) -> Range<usize> {
    if out_len == in_len {
        return out..out + 1;
    }
    let start = out * 2;
    let end = if out + 1 == out_len { in_len } else { start + 2 };
    start..end
}

/// Reduces `src` (shape `from`, `channels` interleaved) to shape `to`.
///
/// Every axis of `to` must either equal the source length or be its halved
/// length. Channels are reduced independently.
pub(crate) fn reduce_blocks<T: Sample>(
    src: &[T],
    from: Shape,
    channels: usize,
    to: Shape,
    filter: Filter,
) -> Vec<T> {
    let mut out = Vec::with_capacity(to.voxel_count() * channels);

    for oz in 0..to.depth {
        let zs = bin(oz, to.depth, from.depth);
        for oy in 0..to.height {
            let ys = bin(oy, to.height, from.height);
            for ox in 0..to.width {
                let xs = bin(ox, to.width, from.width);
                for c in 0..channels {
                    let mut acc = BlockAccumulator::new();
                    for z in zs.clone() {
                        for y in ys.clone() {
                            let row = (z * from.height + y) * from.width;
                            for x in xs.clone() {
                                acc.push(src[(row + x) * channels + c].to_f64());
                            }
                        }
                    }
                    out.push(T::from_f64(acc.finish(filter)));
                }
            }
        }
    }

    out
}
