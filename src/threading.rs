//! 并发提取数

use std::fmt;

/// 环境变量：并发提取数
pub const WORKERS_ENV: &str = "DOCMASK_EXTRACT_WORKERS";

const DEFAULT_MAX_WORKERS: usize = 4;

/// 并发数的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerSource {
    /// 调用方或配置文件指定
    Configured,
    /// `DOCMASK_EXTRACT_WORKERS`
    Env,
    /// 按 CPU 数推算
    Cpu,
}

impl fmt::Display for WorkerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WorkerSource::Configured => "配置",
            WorkerSource::Env => WORKERS_ENV,
            WorkerSource::Cpu => "CPU",
        })
    }
}

fn workers_from_env() -> Option<usize> {
    let raw = std::env::var(WORKERS_ENV).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            log::warn!("[Threading] 忽略无效的 {}={:?}", WORKERS_ENV, raw);
            None
        }
    }
}

fn workers_from_cpu() -> usize {
    std::thread::available_parallelism()
        .map_or(DEFAULT_MAX_WORKERS, |n| n.get())
        .clamp(1, DEFAULT_MAX_WORKERS)
}

/// 决定并发提取数及其来源：指定值 > 环境变量 > min(CPU 数, 4)，0 视为未指定
pub fn resolve_workers(configured: Option<usize>) -> (usize, WorkerSource) {
    if let Some(n) = configured.filter(|n| *n > 0) {
        return (n, WorkerSource::Configured);
    }
    match workers_from_env() {
        Some(n) => (n, WorkerSource::Env),
        None => (workers_from_cpu(), WorkerSource::Cpu),
    }
}

pub fn worker_count(configured: Option<usize>) -> usize {
    resolve_workers(configured).0
}
