//! # 能量轨迹图表
//!
//! 使用 `plotters` 绘制结构弛豫过程中自由能随离子步的变化。
//! 支持 PNG 和 SVG 输出。
//!
//! ## 依赖关系
//! - 被 `commands/plot.rs` 调用
//! - 使用 `plotters` 渲染图表

use crate::error::{CollectError, Result};

use plotters::prelude::*;
use std::path::Path;

/// 生成能量-离子步图表
pub fn generate_energy_plot(
    energies: &[f64],
    output_path: &Path,
    title: &str,
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    if energies.is_empty() {
        return Err(CollectError::Other("No data to plot".to_string()));
    }

    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_energy_chart(&root, energies, title)?;
        root.present()
            .map_err(|e| CollectError::Other(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_energy_chart(&root, energies, title)?;
        root.present()
            .map_err(|e| CollectError::Other(e.to_string()))?;
    }
    Ok(())
}

/// y 轴范围，留出 10% 边距；单点时给固定宽度
fn energy_range(energies: &[f64]) -> (f64, f64) {
    let y_min = energies.iter().copied().fold(f64::INFINITY, f64::min);
    let y_max = energies.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let margin = ((y_max - y_min).abs() * 0.1).max(1e-3);
    (y_min - margin, y_max + margin)
}

fn draw_energy_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    energies: &[f64],
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| CollectError::Other(format!("{:?}", e)))?;

    let (y_lo, y_hi) = energy_range(energies);
    let n = energies.len() as f64;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0.5..(n + 0.5), y_lo..y_hi)
        .map_err(|e| CollectError::Other(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc("Ionic step")
        .y_desc("Free energy (eV)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| CollectError::Other(format!("{:?}", e)))?;

    let points: Vec<(f64, f64)> = energies
        .iter()
        .enumerate()
        .map(|(i, e)| ((i + 1) as f64, *e))
        .collect();

    chart
        .draw_series(LineSeries::new(points.iter().copied(), BLUE.stroke_width(2)))
        .map_err(|e| CollectError::Other(format!("{:?}", e)))?;

    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, BLUE.filled())),
        )
        .map_err(|e| CollectError::Other(format!("{:?}", e)))?
        .label("e_fr_energy")
        .legend(|(x, y)| Circle::new((x + 10, y), 4, BLUE.filled()));

    // 标记最终步
    if let Some(&(x, y)) = points.last() {
        chart
            .draw_series(std::iter::once(Circle::new((x, y), 7, RED.filled())))
            .map_err(|e| CollectError::Other(format!("{:?}", e)))?
            .label("Final step")
            .legend(|(x, y)| Circle::new((x + 10, y), 5, RED.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| CollectError::Other(format!("{:?}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_range_has_margin() {
        let (lo, hi) = energy_range(&[-10.0, -12.0, -11.0]);
        assert!((lo - (-12.2)).abs() < 1e-9);
        assert!((hi - (-9.8)).abs() < 1e-9);
    }

    #[test]
    fn test_energy_range_single_point() {
        let (lo, hi) = energy_range(&[-5.0]);
        assert!(lo < -5.0 && hi > -5.0);
    }

    #[test]
    fn test_empty_plot_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(generate_energy_plot(&[], &dir.path().join("e.svg"), "t", 400, 300, true).is_err());
    }
}
