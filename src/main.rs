use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;

use lsb_seal::{
    cli::{Cli, Commands},
    handler::{
        handle_capacity, handle_decrypt, handle_encrypt, handle_hide, handle_keygen,
        handle_recover,
    },
};

/// 初始化日志输出
///
/// 默认只输出警告，每个 `-v` 提升一级；`RUST_LOG` 可覆盖
fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                buf.timestamp_seconds(),
                record.level(),
                record.args()
            )
        })
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// 程序的主入口点
///
/// 负责解析命令行参数，并根据指定的子命令
/// 将执行分派到相应的处理函数
fn main() -> anyhow::Result<()> {
    // 解析命令行参数
    let cli = Cli::parse();
    init_logger(cli.verbose);

    // 根据子命令调用相应的处理函数
    match cli.command {
        Commands::Hide(args) => handle_hide(args),
        Commands::Recover(args) => handle_recover(args),
        Commands::Encrypt(args) => handle_encrypt(args),
        Commands::Decrypt(args) => handle_decrypt(args),
        Commands::Keygen(args) => handle_keygen(args),
        Commands::Capacity(args) => handle_capacity(args),
    }
}
