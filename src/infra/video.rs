// ============================================================
// Layer 6 — Prediction Video Renderer
// ============================================================
// Draws a skeleton sequence frame by frame and saves it as a
// Motion-JPEG AVI next to the other prediction artifacts:
//
//   prediction_dir/
//     S001C001P001R001A013.avi
//
// Per frame:
//   1. black 1920×1080 canvas
//   2. every joint of every body as a filled circle (radius 5);
//      even bodies red, odd bodies blue
//   3. predicted label in white, true label on the line below
//   4. JPEG-encode the RGB buffer and append it to the AVI
//
// Joint coordinates are used as pixel positions as-is.
//
// Reference: plotters crate documentation (BitMapBackend::with_buffer)
//            image crate documentation (JpegEncoder)

use image::{codecs::jpeg::JpegEncoder, ExtendedColorType, ImageEncoder};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

use crate::domain::error::{TrainError, TrainResult};
use crate::domain::labels::LabelNames;
use crate::domain::skeleton::SkeletonSequence;
use crate::infra::avi::MjpegAvi;

/// Canvas size in pixels (width, height)
pub const CANVAS_SIZE: (u32, u32) = (1920, 1080);

/// Output frame rate
pub const FPS: u32 = 15;

const JOINT_RADIUS: u32 = 5;
const JPEG_QUALITY: u8 = 85;
const CAPTION_ORIGIN: (i32, i32) = (10, 500);
const CAPTION_SIZE: u32 = 100;

/// Render `sequence` to `<output_dir>/<sample_name>.avi` and return the path.
///
/// `video_path`, when given, names the source clip and is stored in the
/// file's INFO/ISRC tag.
pub fn render_prediction_video(
    sequence:        &SkeletonSequence,
    predicted_label: usize,
    true_label:      usize,
    sample_name:     &str,
    label_names:     &LabelNames,
    output_dir:      &Path,
    video_path:      Option<&Path>,
) -> TrainResult<PathBuf> {
    let out_path = output_dir.join(format!("{sample_name}.avi"));
    let (width, height) = CANVAS_SIZE;

    let predicted = format!("predicted: {}", label_names.name(predicted_label));
    let truth     = format!("true: {}", label_names.name(true_label));

    let mut avi = MjpegAvi::new(width, height, FPS);
    if let Some(source) = video_path {
        avi = avi.with_source(source.display().to_string());
    }

    for frame in 0..sequence.frames() {
        let rgb  = draw_frame(sequence, frame, &[&predicted, &truth])
            .map_err(TrainError::render(&out_path))?;
        let jpeg = encode_jpeg(&rgb, width, height).map_err(TrainError::render(&out_path))?;
        avi.push_frame(jpeg);
    }

    avi.finish(&out_path)?;
    tracing::info!(
        "Rendered {} frames of '{}' to '{}'",
        avi.frame_count(),
        sample_name,
        out_path.display()
    );
    Ok(out_path)
}

/// Colour of a body: even bodies red, odd bodies blue.
pub fn body_color(body: usize) -> RGBColor {
    if body % 2 == 0 { RGBColor(255, 0, 0) } else { RGBColor(0, 0, 255) }
}

/// Draw one frame into a fresh RGB buffer.
fn draw_frame(
    sequence: &SkeletonSequence,
    frame:    usize,
    captions: &[&str],
) -> Result<Vec<u8>, String> {
    let (width, height) = CANVAS_SIZE;
    let mut buffer = vec![0u8; (width * height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, CANVAS_SIZE).into_drawing_area();

        for body in 0..sequence.bodies() {
            let color = body_color(body);
            for joint in 0..sequence.joints() {
                let Some((x, y)) = sequence.point(body, frame, joint) else { continue };
                if !x.is_finite() || !y.is_finite() {
                    continue;
                }
                let center = (x.round() as i32, y.round() as i32);
                root.draw(&Circle::new(center, JOINT_RADIUS, color.filled()))
                    .map_err(|e| e.to_string())?;
            }
        }

        let font = ("sans-serif", CAPTION_SIZE).into_font().color(&WHITE);
        for (line, caption) in captions.iter().enumerate() {
            let (x, y) = CAPTION_ORIGIN;
            let y = y + line as i32 * (CAPTION_SIZE as i32 + 20);
            root.draw(&Text::new(caption.to_string(), (x, y), font.clone()))
                .map_err(|e| e.to_string())?;
        }

        root.present().map_err(|e| e.to_string())?;
    }

    Ok(buffer)
}

fn encode_jpeg(rgb: &[u8], width: u32, height: u32) -> image::ImageResult<Vec<u8>> {
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .write_image(rgb, width, height, ExtendedColorType::Rgb8)?;
    Ok(jpeg)
}
