use structopt::StructOpt;

use layout_node::ClusterLayout;

#[derive(StructOpt)]
#[structopt(name = "layout-server")]
struct Opt {
    /// Port to listen on for requests
    #[structopt(short = "p", long = "port")]
    port: u16,

    /// Directory for stable storage (state is kept in memory if omitted)
    #[structopt(short = "d", long = "dir", parse(from_os_str))]
    dir: Option<std::path::PathBuf>,

    /// JSON layout to bootstrap with if the node is not yet bootstrapped
    #[structopt(short = "l", long = "layout", parse(from_os_str))]
    layout: Option<std::path::PathBuf>,

    /// Logging verbosity (-v, -vv, -vvv)
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: u8,
}

fn init_logging(verbose: u8) -> Result<(), fern::InitError> {
    let level = match verbose {
    | 0 => log::LevelFilter::Warn,
    | 1 => log::LevelFilter::Info,
    | 2 => log::LevelFilter::Debug,
    | _ => log::LevelFilter::Trace,
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let opt = Opt::from_args();

    if let Err(error) = init_logging(opt.verbose) {
        eprintln!("[ERROR]: could not initialize logging: {}", error);
    }

    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], opt.port));
    let mut config = layout_consensus::Config::<ClusterLayout>::new(addr);

    if let Some(dir) = opt.dir {
        config = config.with_dir(dir);
    }

    if let Some(path) = opt.layout {
        match ClusterLayout::load(&path) {
        | Ok(layout) => config = config.with_seed(layout),
        | Err(error) => {
            eprintln!("[ERROR]: {}", error);
            std::process::exit(1);
        }
        }
    }

    if let Err(error) = config.run().await {
        log::error!("server stopped: {}", error);
        eprintln!("[ERROR]: {}", error);
        std::process::exit(1);
    }
}
