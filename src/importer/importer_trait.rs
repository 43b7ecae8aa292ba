// ==========================================
// 工地记录管理系统 - 导入组件 Trait
// ==========================================
// 职责: 定义导入管道可替换组件的接口（不包含实现）
// ==========================================

use crate::domain::ImportRow;
use crate::importer::error::ImportResult;
use std::path::Path;

// ==========================================
// TabularDecoder Trait
// ==========================================
// 用途: 文件解码接口（字节 → 行记录）
// 实现者: CsvDecoder
pub trait TabularDecoder: Send + Sync {
    /// 解码字节为行记录（首行为表头）
    ///
    /// # 返回
    /// - Ok(Vec<ImportRow>): 数据行（按文件顺序）
    /// - Err(DecodeError): 空文件 / 无表头 / 读取器报错
    fn decode(&self, bytes: &[u8]) -> ImportResult<Vec<ImportRow>>;

    /// 读取文件并解码
    ///
    /// # 返回
    /// - Err(FileNotFound / UnsupportedFormat / FileReadError / DecodeError)
    fn decode_file(&self, path: &Path) -> ImportResult<Vec<ImportRow>>;
}

// ==========================================
// CredentialHasher Trait
// ==========================================
// 用途: 账号凭据单向哈希
// 实现者: Argon2CredentialHasher
pub trait CredentialHasher: Send + Sync {
    /// 派生不可逆的凭据哈希（PHC 字符串）
    fn hash(&self, secret: &str) -> Result<String, String>;
}
