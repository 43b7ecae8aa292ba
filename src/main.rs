// ==========================================
// 工地记录管理系统 - CSV 导入命令行入口
// ==========================================
// 用法:
//   site-records-import <kind> <csv_path> [db_path]
// 输出: 导入结果 JSON（stdout）
// 退出码: 文件级错误 → 非 0；行级错误不影响退出码
// ==========================================

use anyhow::{bail, Context};
use site_records::api::ImportApi;
use site_records::db::get_default_db_path;
use site_records::importer::supported_tags;
use site_records::logging;
use std::path::PathBuf;

fn usage() -> String {
    format!(
        "usage: site-records-import <kind> <csv_path> [db_path]\n  kinds: {}",
        supported_tags().join(", ")
    )
}

fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let (kind, csv_path) = match (args.next(), args.next()) {
        (Some(kind), Some(csv_path)) => (kind, PathBuf::from(csv_path)),
        _ => bail!(usage()),
    };
    let db_path = args
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(get_default_db_path);

    tracing::info!(
        version = site_records::VERSION,
        db_path = %db_path,
        kind = %kind,
        "启动 CSV 导入"
    );

    let api = ImportApi::new(&db_path)
        .with_context(|| format!("failed to open database {}", db_path))?;
    let report = api
        .import_file(&kind, &csv_path)
        .with_context(|| format!("failed to import {}", csv_path.display()))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
