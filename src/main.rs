use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use spinframe::{
    AppConfig, Axis, Demo, InvalidInputPolicy, LoggingConfig, RateScale, Result, RotateAxis,
    SceneParams, init_logging, run,
};

#[derive(Parser, Debug)]
#[command(name = "spinframe", version, about = "Animated 3D primitives on wgpu")]
struct Cli {
    /// Scene to run: lines, cube, textured, sphere or grid.
    #[arg(long, default_value_t = Demo::default())]
    demo: Demo,

    /// Rotation rate about X in UI units, -100 to 100.
    #[arg(long, allow_hyphen_values = true)]
    rate_x: Option<String>,

    /// Rotation rate about Y in UI units, -100 to 100.
    #[arg(long, allow_hyphen_values = true)]
    rate_y: Option<String>,

    /// Rotation rate about Z in UI units, -100 to 100.
    #[arg(long, allow_hyphen_values = true)]
    rate_z: Option<String>,

    /// Radians per tick at full scale: 0.2 or 0.1.
    #[arg(long, default_value = "0.2")]
    rate_scale: RateScale,

    /// Sphere radius, 0 to 10 (zero keeps the default).
    #[arg(long, allow_hyphen_values = true)]
    radius: Option<String>,

    /// Axis the sphere's light orbits: x, y or z.
    #[arg(long, default_value_t = RotateAxis::default())]
    light_axis: RotateAxis,

    /// Image used as the surface texture.
    #[arg(long)]
    material: Option<PathBuf>,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Log filter, e.g. "debug" or "spinframe=debug,wgpu=warn".
    #[arg(long)]
    log: Option<String>,

    /// What to do with invalid rate or radius values: silent, warn or reject.
    #[arg(long, default_value = "silent")]
    input_policy: InvalidInputPolicy,
}

impl Cli {
    fn scene_params(&self) -> Result<SceneParams> {
        let mut params = SceneParams {
            rate_scale: self.rate_scale,
            light_axis: self.light_axis,
            material: self.material.clone(),
            policy: self.input_policy,
            ..SceneParams::default()
        };

        let rates = [
            (Axis::X, &self.rate_x),
            (Axis::Y, &self.rate_y),
            (Axis::Z, &self.rate_z),
        ];
        for (axis, input) in rates {
            if let Some(input) = input {
                params.set_rate_text(axis, input)?;
            }
        }
        if let Some(radius) = &self.radius {
            params.set_radius_text(radius)?;
        }

        Ok(params)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::default();
    if let Some(filter) = &cli.log {
        logging = logging.with_filter(filter);
    }
    init_logging(logging);

    let result = cli.scene_params().and_then(|params| {
        let config = AppConfig::new()
            .size(cli.width, cli.height)
            .demo(cli.demo)
            .params(params);
        run(config)
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("fatal: {err}");
            ExitCode::FAILURE
        }
    }
}
