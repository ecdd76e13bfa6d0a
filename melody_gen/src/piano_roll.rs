// Piano-roll chart rendered straight to a PNG.
//
// Time runs left to right in beats, pitch bottom to top. Each note is a
// rounded bar spanning [onset, onset + duration) and pitch ± 0.4, filled with
// a viridis-style color picked by where the pitch sits between
// (lowest - 1) and (highest + 1). Y ticks are the distinct pitches, labeled
// with note names; dashed vertical grid lines mark whole beats.
//
// Drawing is done pixel by pixel on an `image::RgbImage`; labels use the 5x7
// font in glyphs.rs.

use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgb, RgbImage};

use crate::error::Result;
use crate::glyphs;
use crate::melody::Melody;
use crate::scale::normalize_key;
use crate::text::{midi_to_name, should_use_flats};

pub const WIDTH: u32 = 1200;
pub const HEIGHT: u32 = 600;

const MARGIN_LEFT: u32 = 80;
const MARGIN_RIGHT: u32 = 24;
const MARGIN_TOP: u32 = 56;
const MARGIN_BOTTOM: u32 = 64;

const FIGURE_BG: Rgb<u8> = Rgb([0x16, 0x21, 0x3e]);
const AXES_BG: Rgb<u8> = Rgb([0x1a, 0x1a, 0x2e]);
const SPINE: Rgb<u8> = Rgb([0x4a, 0x4a, 0x6a]);
const GRID: Rgb<u8> = Rgb([0x36, 0x36, 0x52]);
const NOTE_BORDER: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);
const LABEL: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);

/// Half the bar height, in semitones.
const NOTE_HALF_HEIGHT: f64 = 0.4;
/// Padding around the time axis, in beats.
const TIME_PAD: f64 = 0.1;
const CORNER_RADIUS: i64 = 6;
const BORDER: i64 = 2;

/// Viridis sampled at nine evenly spaced points.
const VIRIDIS: [[u8; 3]; 9] = [
    [68, 1, 84],
    [71, 44, 122],
    [59, 81, 139],
    [44, 113, 142],
    [33, 144, 141],
    [39, 173, 129],
    [92, 200, 99],
    [170, 220, 50],
    [253, 231, 37],
];

/// Map `t` in [0, 1] onto the viridis ramp by linear interpolation.
pub fn viridis(t: f64) -> Rgb<u8> {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - i as f64;
    let (a, b) = (VIRIDIS[i], VIRIDIS[i + 1]);
    let lerp = |x: u8, y: u8| {
        let (x, y) = (f64::from(x), f64::from(y));
        (x + (y - x) * frac).round() as u8
    };
    Rgb([lerp(a[0], b[0]), lerp(a[1], b[1]), lerp(a[2], b[2])])
}

/// Data-to-pixel mapping for the plot area.
struct Axes {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
    t_min: f64,
    t_max: f64,
    p_min: f64,
    p_max: f64,
}

impl Axes {
    fn for_melody(melody: &Melody) -> Self {
        let (low, high) = melody.pitch_bounds().unwrap_or((60, 60));
        let (low, high) = (f64::from(low) - 1.0, f64::from(high) + 1.0);
        Axes {
            left: f64::from(MARGIN_LEFT),
            right: f64::from(WIDTH - MARGIN_RIGHT),
            top: f64::from(MARGIN_TOP),
            bottom: f64::from(HEIGHT - MARGIN_BOTTOM),
            t_min: -TIME_PAD,
            t_max: melody.total_duration() + TIME_PAD,
            p_min: low - 0.5,
            p_max: high + 0.5,
        }
    }

    fn x(&self, t: f64) -> f64 {
        self.left + (t - self.t_min) / (self.t_max - self.t_min) * (self.right - self.left)
    }

    fn y(&self, pitch: f64) -> f64 {
        self.bottom - (pitch - self.p_min) / (self.p_max - self.p_min) * (self.bottom - self.top)
    }

    fn pixels_per_semitone(&self) -> f64 {
        (self.bottom - self.top) / (self.p_max - self.p_min)
    }
}

/// Thin wrapper over the image buffer with clipped drawing primitives.
struct Canvas {
    image: RgbImage,
}

impl Canvas {
    fn new(width: u32, height: u32, background: Rgb<u8>) -> Self {
        Canvas {
            image: RgbImage::from_pixel(width, height, background),
        }
    }

    fn set_pixel_safe(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        let (w, h) = self.image.dimensions();
        if (0..i64::from(w)).contains(&x) && (0..i64::from(h)).contains(&y) {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }

    /// Fill the half-open box [x0, x1) x [y0, y1).
    fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
        for y in y0..y1 {
            for x in x0..x1 {
                self.set_pixel_safe(x, y, color);
            }
        }
    }

    /// Fill [x0, x1) x [y0, y1) with corners rounded to `radius`.
    fn fill_rounded_rect(
        &mut self,
        x0: i64,
        y0: i64,
        x1: i64,
        y1: i64,
        radius: i64,
        color: Rgb<u8>,
    ) {
        if x1 <= x0 || y1 <= y0 {
            return;
        }
        let r = radius.min((x1 - x0 - 1) / 2).min((y1 - y0 - 1) / 2).max(0);
        for y in y0..y1 {
            for x in x0..x1 {
                let cx = x.clamp(x0 + r, x1 - 1 - r);
                let cy = y.clamp(y0 + r, y1 - 1 - r);
                let (dx, dy) = (x - cx, y - cy);
                if dx * dx + dy * dy <= r * r {
                    self.set_pixel_safe(x, y, color);
                }
            }
        }
    }

    fn dashed_vline(&mut self, x: i64, y0: i64, y1: i64, color: Rgb<u8>) {
        for y in y0..y1 {
            if (y - y0) % 8 < 4 {
                self.set_pixel_safe(x, y, color);
            }
        }
    }

    fn text(&mut self, text: &str, x: i64, y: i64, scale: u32, color: Rgb<u8>) {
        glyphs::for_each_pixel(text, x, y, scale, |px, py| self.set_pixel_safe(px, py, color));
    }
}

/// Draw the chart into an image without writing it anywhere.
pub fn render_piano_roll(melody: &Melody, key: &str, scale_name: &str) -> RgbImage {
    let use_flats = should_use_flats(key);
    let axes = Axes::for_melody(melody);
    let mut canvas = Canvas::new(WIDTH, HEIGHT, FIGURE_BG);

    let (left, top) = (axes.left as i64, axes.top as i64);
    let (right, bottom) = (axes.right as i64, axes.bottom as i64);
    canvas.fill_rect(left, top, right, bottom, AXES_BG);

    let pitches = melody.distinct_pitches();
    for &pitch in &pitches {
        let y = axes.y(f64::from(pitch)).round() as i64;
        canvas.fill_rect(left, y, right, y + 1, GRID);
    }

    // At most 17 labeled beats; stepping in f64 so huge totals cannot overflow.
    let total = melody.total_duration();
    let beat_step = (total / 16.0).ceil().max(1.0);
    let mut beat = 0.0;
    while beat <= total {
        let x = axes.x(beat).round() as i64;
        canvas.dashed_vline(x, top, bottom, GRID);
        let label = beat.to_string();
        let w = i64::from(glyphs::text_width(&label, 2));
        canvas.text(&label, x - w / 2, bottom + 8, 2, LABEL);
        beat += beat_step;
    }

    let (low, high) = melody.pitch_bounds().unwrap_or((60, 60));
    let color_low = f64::from(low) - 1.0;
    let color_span = f64::from(high) + 1.0 - color_low;
    for (onset, note) in melody.timed_notes() {
        let pitch = f64::from(note.pitch);
        let x0 = axes.x(onset).round() as i64;
        let x1 = (axes.x(onset + note.duration).round() as i64).max(x0 + 2);
        let y0 = axes.y(pitch + NOTE_HALF_HEIGHT).round() as i64;
        let y1 = (axes.y(pitch - NOTE_HALF_HEIGHT).round() as i64).max(y0 + 2);
        let fill = viridis((pitch - color_low) / color_span);
        canvas.fill_rounded_rect(x0, y0, x1, y1, CORNER_RADIUS, NOTE_BORDER);
        canvas.fill_rounded_rect(
            x0 + BORDER,
            y0 + BORDER,
            x1 - BORDER,
            y1 - BORDER,
            CORNER_RADIUS - BORDER,
            fill,
        );
    }

    canvas.fill_rect(left, top, right, top + 1, SPINE);
    canvas.fill_rect(left, bottom - 1, right, bottom, SPINE);
    canvas.fill_rect(left, top, left + 1, bottom, SPINE);
    canvas.fill_rect(right - 1, top, right, bottom, SPINE);

    let label_scale = if axes.pixels_per_semitone() >= 16.0 { 2 } else { 1 };
    let label_height = i64::from(glyphs::GLYPH_HEIGHT * label_scale);
    for &pitch in &pitches {
        let label = midi_to_name(pitch, use_flats);
        let w = i64::from(glyphs::text_width(&label, label_scale));
        let y = axes.y(f64::from(pitch)).round() as i64;
        canvas.text(&label, left - 8 - w, y - label_height / 2, label_scale, LABEL);
    }

    let x_label = "TIME (BEATS)";
    let w = i64::from(glyphs::text_width(x_label, 2));
    canvas.text(x_label, (left + right) / 2 - w / 2, bottom + 34, 2, LABEL);

    let title = format!("{} {}", normalize_key(key), scale_name.to_uppercase());
    let w = i64::from(glyphs::text_width(&title, 3));
    canvas.text(&title, i64::from(WIDTH) / 2 - w / 2, 16, 3, LABEL);

    canvas.image
}

/// Render the chart, write it as PNG to `output_path` when given, and open it
/// in the system image viewer when `show` is set. Returns the written path.
pub fn plot_piano_roll(
    melody: &Melody,
    key: &str,
    scale_name: &str,
    output_path: Option<&Path>,
    show: bool,
) -> Result<Option<PathBuf>> {
    let image = render_piano_roll(melody, key, scale_name);

    let written = match output_path {
        Some(path) => {
            image.save_with_format(path, ImageFormat::Png)?;
            log::info!("wrote piano roll to {}", path.display());
            Some(path.to_path_buf())
        }
        None => None,
    };

    if show {
        let shown = match &written {
            Some(path) => path.clone(),
            None => {
                let path = std::env::temp_dir().join("melody_piano_roll.png");
                image.save_with_format(&path, ImageFormat::Png)?;
                path
            }
        };
        open_in_viewer(&shown)?;
    }

    Ok(written)
}

fn open_in_viewer(path: &Path) -> Result<()> {
    open::that_detached(path)?;
    log::debug!("opened {} in image viewer", path.display());
    Ok(())
}
