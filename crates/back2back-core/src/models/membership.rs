use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct MembershipPlan {
    pub id: String,
    pub name: String,
    /// Monthly price in dollars. Zero for pay-per-visit plans.
    pub price: f64,
    /// One-time enrollment fee in dollars.
    pub enrollment: f64,
    pub from_price: f64,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl MembershipPlan {
    pub fn is_pay_per_visit(&self) -> bool {
        self.price <= 0.0
    }

    pub fn display_price(&self) -> String {
        if self.is_pay_per_visit() {
            format!("${:.2}/visit", self.from_price)
        } else {
            format!("${:.2}/mo", self.price)
        }
    }

    pub fn find<'a>(plans: &'a [MembershipPlan], plan_id: &str) -> Option<&'a MembershipPlan> {
        plans.iter().find(|plan| plan.id == plan_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_price() {
        let json = r#"{"id":"2","name":"24 HR Free Weights / Burn40","price":119.99,"enrollment":100,"fromPrice":228.46,"features":["Burn40"],"description":"24 HR access"}"#;
        let plan: MembershipPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.display_price(), "$119.99/mo");
        assert!(!plan.is_pay_per_visit());
    }

    #[test]
    fn test_drop_in_display_price() {
        let plan = MembershipPlan {
            id: "4".into(),
            name: "Drop-In".into(),
            price: 0.0,
            enrollment: 0.0,
            from_price: 20.0,
            features: vec![],
            description: "Pay per visit".into(),
        };
        assert_eq!(plan.display_price(), "$20.00/visit");
        assert_eq!(MembershipPlan::find(&[plan], "4").map(|p| p.name.as_str()), Some("Drop-In"));
    }
}
