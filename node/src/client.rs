use std::io::Write;
use std::path::{Path, PathBuf};

use structopt::StructOpt;
use tokio::io::AsyncBufReadExt;
use uuid::Uuid;

use layout_consensus::{Client, Rank, Response};
use layout_node::ClusterLayout;

#[derive(StructOpt)]
#[structopt(name = "layout-client")]
struct Opt {
    /// Port of the layout server to connect to on startup
    #[structopt(short = "p", long = "port")]
    port: Option<u16>,
}

#[derive(Debug, PartialEq)]
enum Command {
    /// Connect to the layout server at the given port
    Connect {
        port: u16,
    },

    /// Drop the current connection
    Disconnect,

    /// Fetch the committed layout and epoch
    Layout,

    /// Bootstrap with the layout in the given JSON file
    Bootstrap {
        path: PathBuf,
    },

    /// Advance the node to a new epoch
    Epoch {
        epoch: u64,
    },

    Prepare {
        sequence: u64,
        epoch: u64,
    },

    /// Prepare again just above the highest rank seen so far
    Retry {
        epoch: u64,
    },

    Propose {
        sequence: u64,
        epoch: u64,
        path: PathBuf,
    },

    Commit {
        sequence: u64,
        epoch: u64,
        path: PathBuf,
    },

    Help,
}

fn usage() {
    println!(
        "{}{}{}{}{}{}{}{}{}{}{}{}{}",
        "-----------------------------------------------------------------------\n",
        "Possible commands:\n",
        "connect <PORT>                  | c  -- Connect to server at <PORT>\n",
        "disconnect                      | d  -- Disconnect from current server\n",
        "layout                          | l  -- Fetch committed layout and epoch\n",
        "bootstrap <FILE>                | b  -- Bootstrap with layout in <FILE>\n",
        "epoch <EPOCH>                   | e  -- Seal the server at <EPOCH>\n",
        "prepare <SEQ> <EPOCH>           | p  -- Send phase one at rank <SEQ>\n",
        "retry <EPOCH>                   | r  -- Send phase one above the highest rank seen\n",
        "propose <SEQ> <EPOCH> <FILE>    | a  -- Send phase two with <FILE>\n",
        "commit <SEQ> <EPOCH> <FILE>     | m  -- Announce <FILE> as committed\n",
        "help                            | h  -- Print this message\n",
        "-----------------------------------------------------------------------",
    );
}

fn number(arg: Option<&str>) -> Result<u64, ()> {
    arg.ok_or(()).and_then(|arg| arg.parse().map_err(|_| ()))
}

fn path(arg: Option<&str>) -> Result<PathBuf, ()> {
    arg.map(PathBuf::from).ok_or(())
}

impl std::str::FromStr for Command {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut iter = s.split_whitespace();
        match iter.next() {
        | Some("help") | Some("h") => Ok(Command::Help),
        | Some("layout") | Some("l") => Ok(Command::Layout),
        | Some("disconnect") | Some("d") => Ok(Command::Disconnect),
        | Some("connect") | Some("c") => {
            iter.next()
                .ok_or(())
                .and_then(|port| port.parse().map_err(|_| ()))
                .map(|port| Command::Connect { port })
        }
        | Some("bootstrap") | Some("b") => {
            path(iter.next()).map(|path| Command::Bootstrap { path })
        }
        | Some("epoch") | Some("e") => {
            number(iter.next()).map(|epoch| Command::Epoch { epoch })
        }
        | Some("prepare") | Some("p") => {
            let sequence = number(iter.next())?;
            let epoch = number(iter.next())?;
            Ok(Command::Prepare { sequence, epoch })
        }
        | Some("retry") | Some("r") => {
            number(iter.next()).map(|epoch| Command::Retry { epoch })
        }
        | Some("propose") | Some("a") => {
            let sequence = number(iter.next())?;
            let epoch = number(iter.next())?;
            let path = path(iter.next())?;
            Ok(Command::Propose { sequence, epoch, path })
        }
        | Some("commit") | Some("m") => {
            let sequence = number(iter.next())?;
            let epoch = number(iter.next())?;
            let path = path(iter.next())?;
            Ok(Command::Commit { sequence, epoch, path })
        }
        | _ => Err(()),
        }
    }
}

async fn connect(port: u16) -> Option<Client<ClusterLayout>> {
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    match Client::connect(addr).await {
    | Ok(client) => {
        println!("[RESPONSE]: connected to server at port {}", port);
        Some(client)
    }
    | Err(error) => {
        println!("[ERROR]: failed to connect to server at port {}: {}", port, error);
        None
    }
    }
}

/// Highest rank known after `response`, given the highest known before it.
fn observe(seen: Option<Rank>, response: &Response<ClusterLayout>) -> Option<Rank> {
    let reported = match response {
    | Response::PrepareReject(rank) => *rank,
    | Response::PrepareAck { rank, .. } => *rank,
    | Response::ProposeReject { phase1, phase2 } => std::cmp::max(*phase1, *phase2),
    | _ => None,
    };
    std::cmp::max(seen, reported)
}

fn load(path: &Path) -> Option<ClusterLayout> {
    match ClusterLayout::load(path) {
    | Ok(layout) => Some(layout),
    | Err(error) => {
        println!("[ERROR]: {}", error);
        None
    }
    }
}

async fn run(port: Option<u16>) {
    // Every session proposes under its own identity
    let proposer = Uuid::new_v4();
    let mut client = match port {
    | Some(port) => connect(port).await,
    | None => None,
    };

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    // Highest rank this session has sent or been told about
    let mut seen: Option<Rank> = None;

    println!("[INFO]: proposing as {}", proposer);

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let line = match lines.next_line().await {
        | Ok(Some(line)) => line,
        | Ok(None) => return,
        | Err(error) => {
            println!("[ERROR]: could not read input: {}", error);
            return
        }
        };

        if line.trim().is_empty() {
            continue
        }

        let command = match line.parse::<Command>() {
        | Ok(command) => command,
        | Err(()) => {
            println!("[ERROR]: could not parse command");
            continue
        }
        };

        match command {
        | Command::Help => { usage(); continue }
        | Command::Connect { port } => { client = connect(port).await; continue }
        | Command::Disconnect => {
            match client.take() {
            | Some(client) => println!("[RESPONSE]: disconnected from {}", client.addr()),
            | None => println!("[ERROR]: not connected"),
            }
            continue
        }
        | _ => (),
        }

        let connection = match client.as_mut() {
        | Some(connection) => connection,
        | None => {
            println!("[ERROR]: not connected to any server");
            continue
        }
        };

        let result = match command {
        | Command::Layout => connection.layout().await,
        | Command::Epoch { epoch } => connection.set_epoch(epoch).await,
        | Command::Prepare { sequence, epoch } => {
            let rank = Rank::new(sequence, proposer);
            seen = std::cmp::max(seen, Some(rank));
            connection.prepare(rank, epoch).await
        }
        | Command::Retry { epoch } => match Rank::above(seen, proposer) {
            | Some(rank) => {
                println!("[INFO]: preparing at {}", rank);
                seen = Some(rank);
                connection.prepare(rank, epoch).await
            }
            | None => {
                println!("[ERROR]: no rank above {:?} is available", seen);
                continue
            }
        },
        | Command::Bootstrap { path } => match load(&path) {
            | Some(layout) => connection.bootstrap(layout).await,
            | None => continue,
        },
        | Command::Propose { sequence, epoch, path } => match load(&path) {
            | Some(layout) => connection.propose(Rank::new(sequence, proposer), layout, epoch).await,
            | None => continue,
        },
        | Command::Commit { sequence, epoch, path } => match load(&path) {
            | Some(layout) => connection.committed(Rank::new(sequence, proposer), layout, epoch).await,
            | None => continue,
        },
        | Command::Help | Command::Connect { .. } | Command::Disconnect => continue,
        };

        match result {
        | Ok(response) => {
            seen = observe(seen, &response);
            println!("[RESPONSE]: {:?}", response);
        }
        | Err(error) => {
            println!("[ERROR]: {}; dropping connection", error);
            client = None;
        }
        }
    }
}

#[tokio::main]
async fn main() {
    let opt = Opt::from_args();
    run(opt.port).await;
}
