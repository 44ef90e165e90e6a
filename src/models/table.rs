//! 表格数据模型
//!
//! 数据源返回的二维表（列名 + 行），以及转换为 JSON 记录的辅助方法

use serde_json::{Map, Value};

/// 一行记录：字段名 -> 标量值（保持列顺序）
pub type Record = Map<String, Value>;

/// 数据源返回的表格
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// 表格中的一行，按列名取值
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl Table {
    /// 以列名创建空表
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// 追加一行，长度不足补 null，多余截断
    pub fn push_row(&mut self, mut values: Vec<Value>) {
        values.resize(self.columns.len(), Value::Null);
        self.rows.push(values);
    }

    /// 由 JSON 对象列表构建表格，列为所有键按首次出现的顺序合并
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Record>,
    {
        let records: Vec<Record> = records.into_iter().collect();
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|mut record| {
                columns
                    .iter()
                    .map(|c| record.remove(c).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 无行即视为无数据
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// 只保留最后 n 行（顺序不变）
    pub fn tail(mut self, n: usize) -> Self {
        let skip = self.rows.len().saturating_sub(n);
        self.rows.drain(..skip);
        self
    }

    /// 按映射表重命名列，未出现在映射中的列保持原名
    pub fn rename_columns(&mut self, mapping: &[(&str, &str)]) {
        for column in self.columns.iter_mut() {
            if let Some((_, to)) = mapping.iter().find(|(from, _)| *from == column.as_str()) {
                *column = (*to).to_string();
            }
        }
    }

    /// 对某一列的每个值做变换，列不存在时不做任何事
    pub fn map_column<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&Value) -> Value,
    {
        if let Some(idx) = self.column_index(name) {
            for row in self.rows.iter_mut() {
                row[idx] = f(&row[idx]);
            }
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |values| Row {
            columns: &self.columns,
            values,
        })
    }

    pub fn first_row(&self) -> Option<Row<'_>> {
        self.rows().next()
    }

    pub fn last_row(&self) -> Option<Row<'_>> {
        self.rows.last().map(|values| Row {
            columns: &self.columns,
            values,
        })
    }

    /// 每行转为一条记录
    pub fn to_records(&self) -> Vec<Record> {
        self.rows().map(|row| row.to_record()).collect()
    }

    /// 将“项目/值”形式的两列表展开为一条扁平记录
    ///
    /// 第 0 列为键，第 1 列为值，均去除首尾空白；空键跳过，重复键以后者为准
    pub fn pivot_key_value(&self) -> Record {
        let mut record = Record::new();
        for row in &self.rows {
            let key = row.first().map(value_to_text).unwrap_or_default();
            if key.is_empty() {
                continue;
            }
            let value = row.get(1).map(value_to_text).unwrap_or_default();
            record.insert(key, Value::String(value));
        }
        record
    }
}

impl<'a> Row<'a> {
    pub fn get(&self, label: &str) -> Option<&'a Value> {
        self.columns
            .iter()
            .position(|c| c == label)
            .map(|idx| &self.values[idx])
    }

    /// 数值字段，缺失或无法解析时为 0
    pub fn f64(&self, label: &str) -> f64 {
        self.get(label).map(value_to_f64).unwrap_or(0.0)
    }

    /// 依次尝试多个字段，返回第一个非零值
    pub fn first_f64(&self, labels: &[&str]) -> f64 {
        labels
            .iter()
            .map(|label| self.f64(label))
            .find(|v| *v != 0.0)
            .unwrap_or(0.0)
    }

    /// 文本字段，缺失时为空串
    pub fn text(&self, label: &str) -> String {
        self.get(label).map(value_to_text).unwrap_or_default()
    }

    pub fn to_record(&self) -> Record {
        self.columns
            .iter()
            .cloned()
            .zip(self.values.iter().cloned())
            .collect()
    }
}

/// 标量转 f64：数字直接取值，字符串尝试解析（兼容千分位和百分号），其余为 0
pub fn value_to_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s
            .trim()
            .trim_end_matches('%')
            .replace(',', "")
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

/// 标量转文本：字符串去空白，数字/布尔转字符串，null 为空串
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kline_table() -> Table {
        let mut table = Table::new(["日期", "收盘", "换手率"]);
        table.push_row(vec![json!("2024-01-02"), json!(300.2), json!("0.12")]);
        table.push_row(vec![json!("2024-01-03"), json!(302.0), json!(0.15)]);
        table.push_row(vec![json!("2024-01-04"), json!("-"), Value::Null]);
        table
    }

    #[test]
    fn test_tail_keeps_order() {
        let table = kline_table().tail(2);
        assert_eq!(table.len(), 2);
        let dates: Vec<String> = table.rows().map(|r| r.text("日期")).collect();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-04"]);

        assert_eq!(kline_table().tail(10).len(), 3);
        assert!(kline_table().tail(0).is_empty());
    }

    #[test]
    fn test_rename_and_records() {
        let mut table = kline_table();
        table.rename_columns(&[("日期", "date"), ("收盘", "close")]);
        let records = table.to_records();
        let keys: Vec<&String> = records[0].keys().collect();
        println!("  记录字段: {:?}", keys);
        assert_eq!(keys, vec!["date", "close", "换手率"]);
        assert_eq!(records[1]["close"], json!(302.0));
    }

    #[test]
    fn test_row_numeric_defaults() {
        let table = kline_table();
        let last = table.last_row().unwrap();
        assert_eq!(last.f64("收盘"), 0.0);
        assert_eq!(last.f64("换手率"), 0.0);
        assert_eq!(last.f64("不存在"), 0.0);

        let first = table.first_row().unwrap();
        assert_eq!(first.f64("换手率"), 0.12);
        assert_eq!(first.first_f64(&["不存在", "收盘"]), 300.2);
    }

    #[test]
    fn test_pivot_key_value() {
        let mut table = Table::new(["项目", "值"]);
        table.push_row(vec![json!(" 董事长 "), json!("马化腾 ")]);
        table.push_row(vec![json!(""), json!("ignored")]);
        table.push_row(vec![json!("员工人数"), json!(105417)]);
        table.push_row(vec![json!("公司网址")]);

        let record = table.pivot_key_value();
        assert_eq!(record.len(), 3);
        assert_eq!(record["董事长"], json!("马化腾"));
        assert_eq!(record["员工人数"], json!("105417"));
        assert_eq!(record["公司网址"], json!(""));
    }

    #[test]
    fn test_from_records_merges_columns() {
        let a: Record = serde_json::from_value(json!({ "A": 1, "B": 2 })).unwrap();
        let b: Record = serde_json::from_value(json!({ "B": 3, "C": 4 })).unwrap();
        let table = Table::from_records(vec![a, b]);

        assert_eq!(table.columns(), &["A", "B", "C"]);
        let records = table.to_records();
        assert_eq!(records[0]["C"], Value::Null);
        assert_eq!(records[1]["A"], Value::Null);
        assert_eq!(records[1]["C"], json!(4));
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(value_to_f64(&json!("1,234.5")), 1234.5);
        assert_eq!(value_to_f64(&json!("12.5%")), 12.5);
        assert_eq!(value_to_f64(&json!(true)), 0.0);
        assert_eq!(value_to_text(&json!(12)), "12");
        assert_eq!(value_to_text(&Value::Null), "");
    }
}
