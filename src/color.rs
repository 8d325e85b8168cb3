//! Background color derived from artwork.

use std::cmp::Reverse;
use std::fmt;

use image::RgbaImage;
use serde::Serialize;

use crate::artwork::DecodedArtwork;

const MAX_SAMPLES: usize = 6_000;
const CLUSTERS: usize = 3;
const MAX_ITER: usize = 10;
const MIN_ALPHA: u8 = 16;

/// Packed ARGB color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BackgroundColor(pub u32);

impl BackgroundColor {
    /// Low-alpha dark neutral used whenever no artwork color is available.
    pub const DEFAULT: Self = Self(0x4026_2220);
    /// Alpha forced onto every color taken from artwork.
    pub const ARTWORK_ALPHA: u8 = 0x66;

    pub fn argb(self) -> u32 {
        self.0
    }

    pub fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn rgb(self) -> [u8; 3] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }

    /// Keep the RGB of `color`, replace its alpha with `ARTWORK_ALPHA`.
    pub fn translucent(color: u32) -> Self {
        Self((color & 0x00FF_FFFF) | (u32::from(Self::ARTWORK_ALPHA) << 24))
    }
}

impl Default for BackgroundColor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

/// Background for the widget given this tick's artwork.
pub fn extract(artwork: &DecodedArtwork) -> BackgroundColor {
    match artwork.bitmap() {
        Some(img) => {
            BackgroundColor::translucent(dominant_color(img, BackgroundColor::DEFAULT.argb()))
        }
        None => BackgroundColor::DEFAULT,
    }
}

/// Most prominent opaque color of `image` as `0xFFRRGGBB`, or `fallback`
/// when the image has no usable pixels.
pub fn dominant_color(image: &RgbaImage, fallback: u32) -> u32 {
    let samples = sample_pixels(image, MAX_SAMPLES);
    if samples.is_empty() {
        return fallback;
    }

    let k = CLUSTERS.min(samples.len());
    let mut clusters = kmeans_clusters(&samples, k, MAX_ITER);
    // Stable sort: ties keep seeding order, so the result is deterministic.
    clusters.sort_by_key(|c| Reverse(c.count));

    match clusters.first() {
        Some(c) if c.count > 0 => pack_rgb(c.centroid),
        _ => fallback,
    }
}

#[derive(Clone, Copy)]
struct Cluster {
    centroid: [f32; 3],
    count: usize,
}

fn sample_pixels(image: &RgbaImage, max_samples: usize) -> Vec<[f32; 3]> {
    let total = image.pixels().len();
    if total == 0 || max_samples == 0 {
        return Vec::new();
    }

    let step = (total / max_samples).max(1);
    image
        .pixels()
        .step_by(step)
        .filter(|p| p.0[3] >= MIN_ALPHA)
        .take(max_samples)
        .map(|p| [f32::from(p.0[0]), f32::from(p.0[1]), f32::from(p.0[2])])
        .collect()
}

fn squared_distance(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    dr * dr + dg * dg + db * db
}

fn nearest(sample: &[f32; 3], centroids: &[[f32; 3]]) -> usize {
    let mut best = 0usize;
    let mut best_dist = f32::MAX;
    for (idx, centroid) in centroids.iter().enumerate() {
        let dist = squared_distance(sample, centroid);
        if dist < best_dist {
            best_dist = dist;
            best = idx;
        }
    }
    best
}

fn kmeans_clusters(samples: &[[f32; 3]], k: usize, max_iter: usize) -> Vec<Cluster> {
    if samples.is_empty() || k == 0 {
        return Vec::new();
    }

    let mut centroids: Vec<[f32; 3]> = (0..k)
        .map(|i| samples[((i * samples.len()) / k).min(samples.len() - 1)])
        .collect();

    for iter in 0..max_iter {
        let mut sums = vec![[0f32; 3]; k];
        let mut counts = vec![0usize; k];

        for sample in samples {
            let best = nearest(sample, &centroids);
            for channel in 0..3 {
                sums[best][channel] += sample[channel];
            }
            counts[best] += 1;
        }

        let mut changed = false;
        for i in 0..k {
            if counts[i] == 0 {
                centroids[i] = samples[(i + iter) % samples.len()];
                changed = true;
                continue;
            }
            let n = counts[i] as f32;
            let next = [sums[i][0] / n, sums[i][1] / n, sums[i][2] / n];
            if squared_distance(&centroids[i], &next) > 1e-2 {
                changed = true;
            }
            centroids[i] = next;
        }

        if !changed {
            break;
        }
    }

    let mut counts = vec![0usize; k];
    for sample in samples {
        counts[nearest(sample, &centroids)] += 1;
    }

    centroids
        .into_iter()
        .zip(counts)
        .map(|(centroid, count)| Cluster { centroid, count })
        .collect()
}

fn pack_rgb(centroid: [f32; 3]) -> u32 {
    let [r, g, b] = centroid.map(|c| c.clamp(0.0, 255.0).round() as u32);
    0xFF00_0000 | (r << 16) | (g << 8) | b
}
