use cve_image::{ops, Image, ImageError};
use cve_imgproc::diffusion::{
    DiffusionFilter, GaussianDiffusivity, PeronaMalikDiffusivity, TotalVariationDiffusivity,
};
use cve_imgproc::filter::{BorderMode, CentralDifferences, SobelFilter};

fn outlier_image(background: f32, outlier: f32) -> Result<Image<f32, 1>, ImageError> {
    let mut image = Image::<f32, 1>::from_size_val([5, 5].into(), background)?;
    image.set_pixel(2, 2, 0, outlier)?;
    Ok(image)
}

#[test]
fn test_outlier_is_smoothed() -> Result<(), ImageError> {
    let src = outlier_image(10.0, 60.0)?;
    let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;

    DiffusionFilter::<f32>::default().apply(&src, &mut dst)?;

    assert!(dst.as_slice().iter().all(|v| v.is_finite()));

    let center = dst.get_pixel(2, 2, 0)?;
    assert!(center < 60.0, "center {center}");

    // contrast with every 4-neighbour drops
    for (x, y) in [(1, 2), (3, 2), (2, 1), (2, 3)] {
        let neighbour = dst.get_pixel(x, y, 0)?;
        assert!(center - neighbour < 50.0, "({x}, {y}): {neighbour}");
    }

    // reflect-101 borders are not exactly conservative, the mean only drifts slightly
    let mean = ops::mean(&dst).unwrap_or_default();
    assert!((mean - 12.0).abs() < 0.1, "mean {mean}");

    Ok(())
}

#[test]
fn test_periodic_borders_preserve_mean() -> Result<(), ImageError> {
    let src = outlier_image(10.0, 60.0)?;
    let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;

    let filter = DiffusionFilter::<f32>::default()
        .with_gradient_filter(SobelFilter::<f32>::new().with_border_mode(BorderMode::Wrap));
    filter.apply(&src, &mut dst)?;

    let mean = ops::mean(&dst).unwrap_or_default();
    assert!((mean - 12.0).abs() < 1e-3, "mean {mean}");
    assert!(dst.get_pixel(2, 2, 0)? < 60.0);

    Ok(())
}

#[test]
fn test_zero_iterations_is_identity() -> Result<(), ImageError> {
    let src = Image::<u8, 3>::from_size_fn([7, 4].into(), |r, c, ch| {
        ((r * 31 + c * 17 + ch * 5) % 256) as u8
    })?;
    let mut dst = Image::<u8, 3>::from_size_val(src.size(), 0)?;

    let filter = DiffusionFilter::<f32>::new(0, 0.05)?;
    filter.apply(&src, &mut dst)?;
    assert_eq!(src, dst);

    let mut inplace = src.clone();
    filter.apply_inplace(&mut inplace)?;
    assert_eq!(src, inplace);

    Ok(())
}

#[test]
fn test_u8_roundtrip_through_working_scalar() -> Result<(), ImageError> {
    let mut src = Image::<u8, 1>::from_size_val([5, 5].into(), 10)?;
    src.set_pixel(2, 2, 0, 60)?;

    let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    DiffusionFilter::<f64>::default().apply(&src, &mut dst)?;

    assert!(dst.get_pixel(2, 2, 0)? < 60);

    Ok(())
}

#[test]
fn test_large_flow_factor_diverges() -> Result<(), ImageError> {
    let src = Image::<f32, 1>::from_size_fn([16, 16].into(), |r, c, _| {
        ((r * 7 + c * 13) % 17) as f32
    })?;
    let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;

    // an almost constant diffusivity makes the scheme linear and unstable
    let filter = DiffusionFilter::<f32>::new(20, 10.0)?
        .with_diffusivity(GaussianDiffusivity::<f32>::new(1e6)?);
    filter.apply(&src, &mut dst)?;

    assert!(dst
        .as_slice()
        .iter()
        .any(|v| !v.is_finite() || v.abs() > 1e6));

    Ok(())
}

#[test]
fn test_total_variation_flat_regions() -> Result<(), ImageError> {
    let src = Image::<f32, 1>::from_size_val([4, 4].into(), 5.0)?;
    let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;

    let regularized = DiffusionFilter::<f32>::new(3, 0.05)?
        .with_diffusivity(TotalVariationDiffusivity::<f32>::new());
    regularized.apply(&src, &mut dst)?;
    assert_eq!(src, dst);

    let unregularized = DiffusionFilter::<f32>::new(3, 0.05)?
        .with_diffusivity(TotalVariationDiffusivity::<f32>::unregularized());
    unregularized.apply(&src, &mut dst)?;
    assert!(dst.as_slice().iter().all(|v| v.is_nan()));

    Ok(())
}

#[test]
fn test_other_gradient_and_diffusivity() -> Result<(), ImageError> {
    let src = outlier_image(10.0, 60.0)?;
    let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;

    let filter = DiffusionFilter::<f32>::default()
        .with_gradient_filter(CentralDifferences::<f32>::new())
        .with_diffusivity(PeronaMalikDiffusivity::<f32>::new(30.0)?);
    filter.apply(&src, &mut dst)?;

    assert!(dst.as_slice().iter().all(|v| v.is_finite()));
    assert!(dst.get_pixel(2, 2, 0)? < 60.0);

    Ok(())
}

#[test]
fn test_channels_are_independent() -> Result<(), ImageError> {
    let gray = outlier_image(10.0, 60.0)?;
    let rgb = Image::<f32, 3>::from_size_fn(gray.size(), |r, c, ch| {
        let v = *gray.get([r, c, 0]).unwrap_or(&0.0);
        if ch == 1 {
            v
        } else {
            0.0
        }
    })?;

    let filter = DiffusionFilter::<f32>::default();

    let mut gray_out = Image::<f32, 1>::from_size_val(gray.size(), 0.0)?;
    filter.apply(&gray, &mut gray_out)?;

    let mut rgb_out = Image::<f32, 3>::from_size_val(rgb.size(), 0.0)?;
    filter.apply(&rgb, &mut rgb_out)?;

    assert_eq!(rgb_out.channel(1)?, gray_out);
    assert!(rgb_out.channel(0)?.as_slice().iter().all(|&v| v == 0.0));

    Ok(())
}
