//! Input column names and presence checks

use serde::{Deserialize, Serialize};

/// Header names of the order-level export. Defaults match the production
/// "auto backtest detail" sheet; any name can be overridden in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub order_id: String,
    pub package_count: String,
    pub batch_count: String,
    pub combination: String,
    pub cost_uplift: String,
    pub threshold_unmet: String,
    pub cost_delta: String,
    pub two_batch_fee: String,
    pub is_two_batch: String,
    pub actual_fee: String,
    pub single_package_fee: String,
    pub revenue: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            order_id: "销售订单号".into(),
            package_count: "包裹数".into(),
            batch_count: "配送批次".into(),
            combination: "最优二批次服务商组合".into(),
            cost_uplift: "费用增幅%(二批次vs单包裹)".into(),
            threshold_unmet: "是否满足当前二批次阈值".into(),
            cost_delta: "二批次vs实际批次_尾程运费变化".into(),
            two_batch_fee: "二批次最优_尾程费用".into(),
            is_two_batch: "当前是否二批次（0/1）".into(),
            actual_fee: "实际批次_尾程费用".into(),
            single_package_fee: "单包裹最优_尾程费用".into(),
            revenue: "销售收入".into(),
        }
    }
}

impl ColumnNames {
    /// Columns without which no simulation can run.
    pub fn required(&self) -> [&str; 8] {
        [
            self.order_id.as_str(),
            self.package_count.as_str(),
            self.batch_count.as_str(),
            self.combination.as_str(),
            self.cost_uplift.as_str(),
            self.threshold_unmet.as_str(),
            self.cost_delta.as_str(),
            self.two_batch_fee.as_str(),
        ]
    }

    /// Columns needed only for the overall before/after impact.
    pub fn impact(&self) -> [&str; 4] {
        [
            self.is_two_batch.as_str(),
            self.actual_fee.as_str(),
            self.single_package_fee.as_str(),
            self.revenue.as_str(),
        ]
    }
}

/// Names from `wanted` that are absent from `headers`, in `wanted` order.
pub fn missing_columns(headers: &[String], wanted: &[&str]) -> Vec<String> {
    wanted
        .iter()
        .filter(|name| !headers.iter().any(|h| h.trim() == **name))
        .map(|name| name.to_string())
        .collect()
}
