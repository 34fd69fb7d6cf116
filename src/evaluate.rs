use std::time::Instant;

use tracing::trace;

use crate::{FilterInfo, FilterReport, Rule, Status};

/// Index and status of the first rule with an opinion, if any.
pub(crate) fn first_decision<I: FilterInfo + ?Sized>(
    rules: &[Rule],
    info: &I,
) -> Option<(usize, Status)> {
    rules.iter().enumerate().find_map(|(idx, rule)| {
        let status = rule.check(info);
        status.is_decided().then_some((idx, status))
    })
}

pub(crate) fn evaluate<I: FilterInfo + ?Sized>(rules: &[Rule], info: &I) -> Status {
    match first_decision(rules, info) {
        Some((idx, status)) => {
            let rule = &rules[idx];
            trace!(
                class = info.class_name().unwrap_or(""),
                position = idx,
                %rule,
                %status,
                "filter decided"
            );
            status
        }
        None => Status::Undecided,
    }
}

pub(crate) fn evaluate_detailed<I: FilterInfo + ?Sized>(rules: &[Rule], info: &I) -> FilterReport {
    let start = Instant::now();
    let decision = first_decision(rules, info);
    let duration = start.elapsed();

    match decision {
        Some((idx, status)) => FilterReport::new(
            status,
            Some((idx, rules[idx].to_string())),
            idx + 1,
            duration,
        ),
        None => FilterReport::new(Status::Undecided, None, rules.len(), duration),
    }
}

#[cfg(test)]
mod tests {
    use crate::{FilterChain, Query, Status};

    fn eval(spec: &str, query: &Query<'_>) -> Status {
        FilterChain::compile(spec).unwrap().evaluate(query)
    }

    #[test]
    fn eval_exact_allow() {
        assert_eq!(eval("com.a.X", &Query::new().class("com.a.X")), Status::Allow);
        assert_eq!(
            eval("com.a.X", &Query::new().class("com.a.Y")),
            Status::Undecided
        );
    }

    #[test]
    fn eval_exact_deny() {
        assert_eq!(
            eval("!com.a.X", &Query::new().class("com.a.X")),
            Status::Reject
        );
    }

    #[test]
    fn eval_two_exact_allows() {
        let q = |c| eval("com.a.X;com.a.Y", &Query::new().class(c));
        assert_eq!(q("com.a.X"), Status::Allow);
        assert_eq!(q("com.a.Y"), Status::Allow);
        assert_eq!(q("com.a.Z"), Status::Undecided);
    }

    #[test]
    fn eval_exact_sets_do_not_cross_polarity() {
        let q = |c| eval("!com.a.Bad;com.a.Good", &Query::new().class(c));
        assert_eq!(q("com.a.Bad"), Status::Reject);
        assert_eq!(q("com.a.Good"), Status::Allow);
    }

    #[test]
    fn eval_first_decisive_rule_wins() {
        let deny_first = "!com.evil.Bad;com.evil.*";
        let allow_first = "com.evil.*;!com.evil.Bad";
        let bad = Query::new().class("com.evil.Bad");
        assert_eq!(eval(deny_first, &bad), Status::Reject);
        assert_eq!(eval(allow_first, &bad), Status::Allow);
    }

    #[test]
    fn eval_all_undecided() {
        let q = Query::new().class("org.other.Thing").depth(1);
        assert_eq!(eval("maxdepth=5;com.a.*;!com.b.**", &q), Status::Undecided);
    }

    #[test]
    fn eval_limit_after_allow_is_shadowed() {
        // A matching allow earlier in the chain ends evaluation first.
        let q = Query::new().class("a.B").depth(10);
        assert_eq!(eval("a.B;maxdepth=5", &q), Status::Allow);
        assert_eq!(eval("maxdepth=5;a.B", &q), Status::Reject);
    }

    #[test]
    fn eval_wildcard_matches_absent_class() {
        assert_eq!(eval("*", &Query::new()), Status::Allow);
        assert_eq!(eval("!*", &Query::new()), Status::Reject);
        assert_eq!(eval("a.*", &Query::new()), Status::Undecided);
    }

    #[test]
    fn detailed_reports_deciding_rule() {
        let chain = FilterChain::compile("maxdepth=3;java.lang.*;!java.lang.Runtime").unwrap();
        let report = chain.explain(&Query::new().class("java.lang.String"));
        assert_eq!(report.status(), Status::Allow);
        assert_eq!(report.decided_by(), Some((1, "java.lang.*")));
        assert_eq!(report.rules_checked(), 2);
    }

    #[test]
    fn detailed_undecided_checks_every_rule() {
        let chain = FilterChain::compile("maxdepth=3;java.lang.*").unwrap();
        let report = chain.explain(&Query::new().class("x.Y"));
        assert_eq!(report.status(), Status::Undecided);
        assert_eq!(report.decided_by(), None);
        assert_eq!(report.rules_checked(), 2);
    }
}
