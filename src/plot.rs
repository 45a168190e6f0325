use std::{ops::Range, path::Path};

use plotters::{coord::Shift, prelude::*};

use crate::{predict::Prediction, Error, Float, Result};

const SIZE: (u32, u32) = (1400, 600);

/// Writes the test chart as a PNG.
///
/// The figure is split into two panels; the test chart is drawn on the left
/// and the right panel is left blank.
pub fn plot_test_prediction<P: AsRef<Path>>(path: P, prediction: &Prediction) -> Result<()> {
    let root = BitMapBackend::new(path.as_ref(), SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;
    let (left, _right) = root.split_horizontally(SIZE.0 / 2);
    draw_test(&left, prediction).map_err(plot_error)?;
    root.present().map_err(plot_error)?;
    Ok(())
}

fn draw_test<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    prediction: &Prediction,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let truth: Vec<Float> = prediction.targets.iter().cloned().collect();
    let predicted: Vec<Float> = prediction.predictions.iter().cloned().collect();
    let x_max = truth.len().max(1) as Float;

    let mut chart = ChartBuilder::on(area)
        .caption("Test Prediction", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..x_max, value_range(&[&truth, &predicted]))?;

    chart
        .configure_mesh()
        .x_desc("Scaled Time")
        .y_desc("Scaled Moisture")
        .draw()?;

    chart
        .draw_series(LineSeries::new(points(&truth), &BLUE))?
        .label("Test True")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
    chart
        .draw_series(LineSeries::new(points(&predicted), &RED))?
        .label("Test Predicted")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    Ok(())
}

fn points(values: &[Float]) -> impl Iterator<Item = (Float, Float)> + '_ {
    values.iter().enumerate().map(|(i, &v)| (i as Float, v))
}

/// Y range covering every finite value of `series` with a 5% margin.
fn value_range(series: &[&[Float]]) -> Range<Float> {
    let (min, max) = series
        .iter()
        .flat_map(|s| s.iter())
        .filter(|v| v.is_finite())
        .fold((Float::INFINITY, Float::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return 0.0..1.0;
    }
    let pad = if max > min { (max - min) * 0.05 } else { 0.5 };
    (min - pad)..(max + pad)
}

fn plot_error<E: std::error::Error>(e: E) -> Error {
    Error::Plot(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array2};

    fn prediction() -> Prediction {
        Prediction {
            predictions: arr2(&[[0.1], [0.5], [0.4]]),
            targets: arr2(&[[0.2], [0.6], [0.3]]),
        }
    }

    #[test]
    fn writes_png() {
        let path = std::env::temp_dir().join("rust_rnn_test_plot.png");
        std::fs::remove_file(&path).ok();
        plot_test_prediction(&path, &prediction()).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.len() > 8);
        assert_eq!(&bytes[1..4], b"PNG");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn writes_empty_chart() {
        let path = std::env::temp_dir().join("rust_rnn_test_plot_empty.png");
        let empty = Prediction {
            predictions: Array2::zeros((0, 1)),
            targets: Array2::zeros((0, 1)),
        };
        plot_test_prediction(&path, &empty).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn unwritable_path() {
        let path = std::env::temp_dir()
            .join("rust_rnn_test_no_such_dir")
            .join("plot.png");
        let result = plot_test_prediction(&path, &prediction());
        assert!(matches!(result, Err(Error::Plot(_))));
    }

    #[test]
    fn range_covers_both() {
        let truth: [Float; 3] = [0.2, 0.4, 0.6];
        let predicted: [Float; 3] = [0.0, 0.5, 1.0];
        let range = value_range(&[&truth, &predicted]);
        assert!(range.start < 0.0 && range.start > -0.1);
        assert!(range.end > 1.0 && range.end < 1.1);
    }

    #[test]
    fn range_flat() {
        let flat: [Float; 2] = [0.3, 0.3];
        let range = value_range(&[&flat]);
        assert!((range.start + 0.2).abs() < 1e-6);
        assert!((range.end - 0.8).abs() < 1e-6);
    }

    #[test]
    fn range_empty_or_nan() {
        let empty: [Float; 0] = [];
        let nan: [Float; 1] = [Float::NAN];
        assert_eq!(value_range(&[&empty]), 0.0..1.0);
        assert_eq!(value_range(&[&nan]), 0.0..1.0);
    }

    #[test]
    fn points_are_indexed() {
        let p: Vec<_> = points(&[0.5, 0.25]).collect();
        assert_eq!(p, vec![(0.0, 0.5), (1.0, 0.25)]);
    }
}
