//! Property-based tests for principal and condition interpretation
//!
//! Uses proptest to check the accessors over generated statements

use funcurl_policy::policy::account_id;
use funcurl_policy::PolicyStatement;
use proptest::prelude::*;
use serde_json::json;

fn statement(principal: serde_json::Value, condition: serde_json::Value) -> PolicyStatement {
    serde_json::from_value(json!({
        "Effect": "Allow",
        "Principal": principal,
        "Action": "lambda:InvokeFunctionUrl",
        "Resource": "arn:aws:lambda:us-east-1:123456789012:function:hello",
        "Condition": condition
    }))
    .unwrap()
}

proptest! {
    #[test]
    fn prop_account_arn_yields_account_id(
        partition in "aws|aws-cn|aws-us-gov",
        account in "[0-9]{12}",
        resource in "root|user/[a-z]{1,12}|role/[a-z-]{1,12}"
    ) {
        let arn = format!("arn:{}:iam::{}:{}", partition, account, resource);
        let stmt = statement(json!({"AWS": arn}), json!({}));
        prop_assert_eq!(stmt.principal_string(), Some(account.as_str()));
    }

    #[test]
    fn prop_non_arn_values_pass_through(value in "[a-z0-9.*-]{0,40}") {
        prop_assume!(!value.starts_with("arn:"));
        prop_assert_eq!(account_id(&value), value.as_str());

        let stmt = statement(json!({"Service": value.clone()}), json!({}));
        prop_assert_eq!(stmt.principal_string(), Some(value.as_str()));
    }

    #[test]
    fn prop_truncated_arns_pass_through(account in "[0-9]{12}", cut in 0usize..5) {
        let segments = ["arn", "aws", "iam", "", account.as_str()];
        let value = segments[..=cut].join(":");
        prop_assert_eq!(account_id(&value), value.as_str());
    }

    #[test]
    fn prop_condition_lookup_is_stable(
        org in "o-[a-z0-9]{10}",
        source in "arn:aws:cloudfront::[0-9]{12}:distribution/[A-Z0-9]{14}",
        org_first in any::<bool>()
    ) {
        let condition = if org_first {
            json!({
                "StringEquals": {"aws:PrincipalOrgID": org},
                "ArnLike": {"aws:SourceArn": source}
            })
        } else {
            json!({
                "ArnLike": {"aws:SourceArn": source},
                "StringEquals": {"aws:PrincipalOrgID": org}
            })
        };
        let stmt = statement(json!("*"), condition);

        for _ in 0..2 {
            prop_assert_eq!(stmt.principal_org_id(), Some(org.as_str()));
            prop_assert_eq!(stmt.source_arn(), Some(source.as_str()));
            prop_assert_eq!(stmt.principal_string(), Some("*"));
        }
    }
}
