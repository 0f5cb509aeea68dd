//! # 二维码扫描工具 — 命令行入口
//!
//! 本文件仅负责日志初始化、参数解析与退出码。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::process;

use qr_scanner::cli;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match cli::parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("{}", cli::usage());
            process::exit(err.exit_code());
        }
    };

    if args.help {
        println!("{}", cli::usage());
        return;
    }

    match cli::run(args).await {
        Ok(code) => process::exit(code),
        Err(err) => {
            log::error!("❌ 运行失败: {}", err);
            eprintln!("{}", err);
            process::exit(err.exit_code());
        }
    }
}
