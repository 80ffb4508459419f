//! Flow-table dump parsing.
//!
//! Drivers detect readiness by dumping a switch's OpenFlow table
//! (`ovs-ofctl -O OpenFlow13 dump-flows <bridge>`) and counting the rules
//! Faucet installed. A line counts as an installed forwarding rule only if
//! it carries an explicit action clause and a cookie (Faucet stamps every
//! rule it installs); bare drop entries such as the table-miss default are
//! excluded.

use regex::Regex;
use std::sync::LazyLock;

/// Compiled patterns for flow-dump lines
pub struct FlowPatterns {
    /// Match an explicit action clause: "actions=output:...", "actions=goto_table:1"
    pub action_clause: Regex,
    /// Match the installation identifier Faucet stamps on its rules
    pub cookie: Regex,
    /// Match drop entries anywhere on the line, case-insensitively
    pub drop_entry: Regex,
}

impl FlowPatterns {
    fn new() -> Self {
        Self {
            action_clause: Regex::new(r"actions=\S").expect("Invalid action_clause regex"),
            cookie: Regex::new(r"cookie=0x[0-9a-fA-F]+").expect("Invalid cookie regex"),
            drop_entry: Regex::new(r"(?i)drop").expect("Invalid drop_entry regex"),
        }
    }
}

/// Global patterns instance
pub static PATTERNS: LazyLock<FlowPatterns> = LazyLock::new(FlowPatterns::new);

/// Returns true if the line is a controller-installed forwarding rule
pub fn is_forwarding_rule(line: &str) -> bool {
    PATTERNS.cookie.is_match(line)
        && PATTERNS.action_clause.is_match(line)
        && !PATTERNS.drop_entry.is_match(line)
}

/// Count controller-installed forwarding rules in a flow-table dump
pub fn count_forwarding_rules(dump: &str) -> usize {
    dump.lines().filter(|line| is_forwarding_rule(line)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trimmed from a real Faucet dump on sw1
    const SAMPLE_DUMP: &str = r#"OFPST_FLOW reply (OF1.3) (xid=0x2):
 cookie=0x5adc15c0, duration=10.123s, table=0, n_packets=0, n_bytes=0, priority=4096,in_port="sw1-eth1",vlan_tci=0x0000/0x1fff actions=push_vlan:0x8100,set_field:4196->vlan_vid,goto_table:1
 cookie=0x5adc15c0, duration=10.123s, table=1, n_packets=0, n_bytes=0, priority=8191,in_port="sw1-eth1",dl_vlan=100,dl_src=aa:bb:cc:dd:ee:01 actions=goto_table:2
 cookie=0x5adc15c0, duration=10.123s, table=2, n_packets=0, n_bytes=0, priority=8192,dl_vlan=100,dl_dst=aa:bb:cc:dd:ee:01 actions=pop_vlan,output:"sw1-eth1"
 cookie=0x5adc15c0, duration=10.123s, table=0, n_packets=5, n_bytes=350, priority=0 actions=drop
"#;

    #[test]
    fn test_counts_only_installed_forwarding_rules() {
        // Header line has no cookie; the table-miss entry is a drop
        assert_eq!(count_forwarding_rules(SAMPLE_DUMP), 3);
    }

    #[test]
    fn test_empty_dump_has_no_rules() {
        assert_eq!(count_forwarding_rules(""), 0);
        assert_eq!(count_forwarding_rules("OFPST_FLOW reply (OF1.3) (xid=0x2):\n"), 0);
    }

    #[test]
    fn test_rule_without_cookie_is_not_counted() {
        let line = " table=0, priority=1 actions=output:2";
        assert!(!is_forwarding_rule(line));
    }

    #[test]
    fn test_drop_rule_is_excluded_case_insensitively() {
        let line = " cookie=0xdeadbeef, table=0, priority=0 actions=DROP";
        assert!(!is_forwarding_rule(line));
    }
}
