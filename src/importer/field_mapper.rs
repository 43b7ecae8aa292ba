// ==========================================
// 工地记录管理系统 - 字段读取器
// ==========================================
// 职责: 行记录字段提取 + 类型转换
// 规则:
// - 小数: 接受 ',' 或 '.' 作为小数点（先统一为 '.' 再转换）
// - 日期: DD/MM/YYYY；时间: HH:MM（24 小时制），格式可由配置覆写
// - 多值列: ';' 分隔，空成员丢弃
// ==========================================

use crate::config::import_config_trait::{
    ImportConfigReader, DEFAULT_DATE_FORMAT, DEFAULT_LIST_SEPARATOR, DEFAULT_TIME_FORMAT,
};
use crate::domain::ImportRow;
use crate::importer::error::{RowError, RowResult};
use chrono::{NaiveDate, NaiveTime};
use std::error::Error;

// ==========================================
// FieldFormats - 解析格式
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFormats {
    pub date_format: String,
    pub time_format: String,
    pub list_separator: String,
}

impl Default for FieldFormats {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            list_separator: DEFAULT_LIST_SEPARATOR.to_string(),
        }
    }
}

impl FieldFormats {
    /// 从配置读取解析格式
    pub fn from_config<C: ImportConfigReader + ?Sized>(config: &C) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            date_format: config.get_date_format()?,
            time_format: config.get_time_format()?,
            list_separator: config.get_list_separator()?,
        })
    }
}

/// 小数点统一为 '.'
pub fn normalize_decimal(value: &str) -> String {
    value.trim().replace(',', ".")
}

// ==========================================
// FieldMapper - 单行字段读取
// ==========================================
pub struct FieldMapper<'a> {
    row: &'a ImportRow,
    formats: &'a FieldFormats,
}

impl<'a> FieldMapper<'a> {
    pub fn new(row: &'a ImportRow, formats: &'a FieldFormats) -> Self {
        Self { row, formats }
    }

    /// 提取字符串字段（空白视为不存在）
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.row
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// 提取原始字符串字段（不去空白；全空白视为不存在）
    pub fn raw_string(&self, key: &str) -> Option<String> {
        self.row
            .get(key)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }

    /// 提取必填字符串字段
    pub fn required_string(&self, key: &str) -> RowResult<String> {
        self.get_string(key)
            .ok_or_else(|| RowError::MissingField(key.to_string()))
    }

    /// 提取可选文本（不存在时为空字符串）
    pub fn text_or_empty(&self, key: &str) -> String {
        self.get_string(key).unwrap_or_default()
    }

    /// 解析必填小数
    pub fn parse_decimal(&self, key: &str) -> RowResult<f64> {
        let value = self.required_string(key)?;
        Self::to_decimal(key, &value)
    }

    /// 解析可选小数（不存在时为 None）
    pub fn parse_optional_decimal(&self, key: &str) -> RowResult<Option<f64>> {
        self.get_string(key)
            .map(|value| Self::to_decimal(key, &value))
            .transpose()
    }

    fn to_decimal(key: &str, value: &str) -> RowResult<f64> {
        normalize_decimal(value)
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| RowError::InvalidNumber {
                field: key.to_string(),
                value: value.to_string(),
            })
    }

    /// 解析必填整数
    pub fn parse_i32(&self, key: &str) -> RowResult<i32> {
        let value = self.required_string(key)?;
        Self::to_i32(key, &value)
    }

    /// 解析可选整数（不存在时为 None）
    pub fn parse_optional_i32(&self, key: &str) -> RowResult<Option<i32>> {
        self.get_string(key)
            .map(|value| Self::to_i32(key, &value))
            .transpose()
    }

    fn to_i32(key: &str, value: &str) -> RowResult<i32> {
        value.parse::<i32>().map_err(|_| RowError::InvalidInteger {
            field: key.to_string(),
            value: value.to_string(),
        })
    }

    /// 解析日期
    pub fn parse_date(&self, key: &str) -> RowResult<NaiveDate> {
        let value = self.required_string(key)?;
        NaiveDate::parse_from_str(&value, &self.formats.date_format).map_err(|_| {
            RowError::InvalidDate {
                field: key.to_string(),
                value,
                format: self.formats.date_format.clone(),
            }
        })
    }

    /// 解析时间
    pub fn parse_time(&self, key: &str) -> RowResult<NaiveTime> {
        let value = self.required_string(key)?;
        NaiveTime::parse_from_str(&value, &self.formats.time_format).map_err(|_| {
            RowError::InvalidTime {
                field: key.to_string(),
                value,
                format: self.formats.time_format.clone(),
            }
        })
    }

    /// 解析可选布尔标记（true/false, 1/0, yes/no）
    pub fn parse_flag(&self, key: &str) -> RowResult<Option<bool>> {
        match self.get_string(key) {
            None => Ok(None),
            Some(value) => match value.to_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(Some(true)),
                "false" | "0" | "no" => Ok(Some(false)),
                _ => Err(RowError::InvalidValue {
                    field: key.to_string(),
                    value,
                }),
            },
        }
    }

    /// 解析可选枚举
    pub fn parse_optional_enum<T>(
        &self,
        key: &str,
        parse: fn(&str) -> Option<T>,
    ) -> RowResult<Option<T>> {
        match self.get_string(key) {
            None => Ok(None),
            Some(value) => parse(&value)
                .map(Some)
                .ok_or(RowError::InvalidValue {
                    field: key.to_string(),
                    value,
                }),
        }
    }

    /// 解析多值列（列不存在或为空白时返回 None）
    pub fn parse_list(&self, key: &str) -> Option<Vec<String>> {
        self.get_string(key).map(|value| {
            value
                .split(self.formats.list_separator.as_str())
                .map(str::trim)
                .filter(|member| !member.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}
