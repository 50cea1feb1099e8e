use std::path::PathBuf;

use clap::Parser;
use label_rows::{
    DisplayTransform, FrameAnnotations, ImageSurface, RecordedFrame, Result, RowFilterBuilder,
    RowFilterConfig,
};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Groups a recorded text recognition frame into nutrition label rows.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Recorded recognition frame (JSON).
    frame: PathBuf,
    /// Filter settings (JSON); defaults to the nutrition label keywords.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Image the frame was recognized from, to draw the overlay on.
    #[arg(long, requires = "overlay")]
    image: Option<PathBuf>,
    /// Where to write the overlay image.
    #[arg(long, requires = "image")]
    overlay: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => RowFilterConfig::load(path)?,
        None => RowFilterConfig::default(),
    };
    let filter = RowFilterBuilder::from_config(config).build()?;

    let frame = RecordedFrame::load(&args.frame)?;
    let size = (frame.width, frame.height);
    let lines = filter.cluster(frame.into_lines());
    let table = filter.group(&lines);
    for row in &table {
        println!("{}", row.texts.join("\t"));
    }

    if let (Some(image), Some(out)) = (&args.image, &args.overlay) {
        let image = image::open(image)?;
        let mut surface = ImageSurface::new(&image);
        let (width, height) = surface.size();
        let transform = DisplayTransform::aspect_fill(size, (width as f64, height as f64));
        FrameAnnotations::build(&lines, table, &transform).apply(&mut surface);
        surface.into_image().save(out)?;
        log::info!("Overlay written to {out:?}");
    }
    Ok(())
}
