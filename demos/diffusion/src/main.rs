use argh::FromArgs;
use std::path::PathBuf;

use cve::{
    image::Image,
    imgproc::{
        diffusion::{
            DiffusionFilter, Diffusivity, GaussianDiffusivity, PeronaMalikDiffusivity,
            TotalVariationDiffusivity,
        },
        filter::{BorderMode, CentralDifferences, DifferenceFilter, GradientFilter, SobelFilter},
    },
    io::{pgm, pnm, ppm},
};

#[derive(FromArgs)]
/// Smooth a PGM or PPM image with nonlinear diffusion
struct Args {
    /// path to the input image (.pgm, .ppm or .pnm)
    #[argh(option, short = 'i')]
    input: PathBuf,

    /// path to the output image, same format as the input
    #[argh(option, short = 'o')]
    output: PathBuf,

    /// number of iterations
    #[argh(option, default = "10")]
    iterations: usize,

    /// flow factor of each explicit step
    #[argh(option, default = "0.05")]
    flow: f32,

    /// contrast parameter of the gaussian and perona-malik diffusivities
    #[argh(option, default = "30.0")]
    lambda: f32,

    /// diffusivity: gaussian, tv or perona-malik
    #[argh(option, default = "String::from(\"gaussian\")")]
    diffusivity: String,

    /// gradient filter: sobel, central, forward or backward
    #[argh(option, default = "String::from(\"sobel\")")]
    gradient: String,

    /// border mode: reflect, replicate, zero or wrap
    #[argh(option, default = "String::from(\"reflect\")")]
    border: String,
}

fn parse_border(name: &str) -> Result<BorderMode, Box<dyn std::error::Error>> {
    Ok(match name.to_lowercase().as_str() {
        "reflect" => BorderMode::Reflect,
        "replicate" => BorderMode::Replicate,
        "zero" => BorderMode::ZeroPad,
        "wrap" => BorderMode::Wrap,
        other => return Err(format!("unknown border mode: {other}").into()),
    })
}

fn diffuse<D, G>(
    args: &Args,
    filter: DiffusionFilter<f32, D, G>,
) -> Result<(), Box<dyn std::error::Error>>
where
    D: Diffusivity<f32>,
    G: GradientFilter<Scalar = f32>,
{
    // the magic number decides between gray and color, also for `.pnm` files
    let header = pnm::read_header(&args.input)?;
    if header.format.num_channels() == 3 {
        let src = ppm::read_image_ppm(&args.input)?;
        let mut dst = Image::<u8, 3>::from_size_val(src.size(), 0)?;
        log::info!("loaded {} rgb image {}", args.input.display(), src.size());
        filter.apply(&src, &mut dst)?;
        ppm::write_image_ppm(&args.output, &dst)?;
    } else {
        let src = pgm::read_image_pgm(&args.input)?;
        let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0)?;
        log::info!("loaded {} gray image {}", args.input.display(), src.size());
        filter.apply(&src, &mut dst)?;
        pgm::write_image_pgm(&args.output, &dst)?;
    }

    log::info!("saved {}", args.output.display());

    Ok(())
}

fn with_diffusivity<G>(args: &Args, gradient_filter: G) -> Result<(), Box<dyn std::error::Error>>
where
    G: GradientFilter<Scalar = f32>,
{
    let filter = DiffusionFilter::<f32>::new(args.iterations, args.flow)?
        .with_gradient_filter(gradient_filter);

    match args.diffusivity.to_lowercase().as_str() {
        "gaussian" => diffuse(
            args,
            filter.with_diffusivity(GaussianDiffusivity::new(args.lambda)?),
        ),
        "tv" => diffuse(
            args,
            filter.with_diffusivity(TotalVariationDiffusivity::<f32>::new()),
        ),
        "perona-malik" => diffuse(
            args,
            filter.with_diffusivity(PeronaMalikDiffusivity::new(args.lambda)?),
        ),
        other => Err(format!("unknown diffusivity: {other}").into()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Args = argh::from_env();
    let border = parse_border(&args.border)?;

    match args.gradient.to_lowercase().as_str() {
        "sobel" => with_diffusivity(&args, SobelFilter::<f32>::new().with_border_mode(border)),
        "central" => with_diffusivity(
            &args,
            CentralDifferences::<f32>::new().with_border_mode(border),
        ),
        "forward" => with_diffusivity(
            &args,
            DifferenceFilter::<f32>::forward().with_border_mode(border),
        ),
        "backward" => with_diffusivity(
            &args,
            DifferenceFilter::<f32>::backward().with_border_mode(border),
        ),
        other => Err(format!("unknown gradient filter: {other}").into()),
    }
}
