//! # Line Splitting
//!
//! How many lines of a wrapped paragraph go on the current page. All lines
//! of a paragraph share one style, so the decision is a count: the lines that
//! fit, bounded by the orphan and widow minimums.

/// Orphan/widow minimums, in lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRules {
    /// Fewest lines allowed at the bottom of a page.
    pub min_orphan: usize,
    /// Fewest lines allowed to start the next page.
    pub min_widow: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSplit {
    /// Every remaining line fits here.
    All,
    /// Nothing goes on this page.
    NextPage,
    /// Draw this many lines here and carry the rest over.
    Take(usize),
}

/// Whole lines of `line_height` that fit in `remaining`. An exact fit counts.
pub fn lines_that_fit(remaining: f64, line_height: f64) -> usize {
    if line_height <= 0.0 {
        return usize::MAX;
    }
    ((remaining + 1e-6) / line_height).floor().max(0.0) as usize
}

/// Split `total` lines when `fitting` of them fit on the current page.
pub fn split_lines(fitting: usize, total: usize, rules: LineRules) -> LineSplit {
    if fitting >= total {
        return LineSplit::All;
    }
    if fitting == 0 || fitting < rules.min_orphan {
        return LineSplit::NextPage;
    }
    if total - fitting >= rules.min_widow {
        return LineSplit::Take(fitting);
    }
    // Pull lines back so the next page starts with `min_widow` of them.
    let take = total.saturating_sub(rules.min_widow);
    if take == 0 || take < rules.min_orphan {
        LineSplit::NextPage
    } else {
        LineSplit::Take(take)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: LineRules = LineRules {
        min_orphan: 2,
        min_widow: 2,
    };

    #[test]
    fn exact_fit_counts() {
        assert_eq!(lines_that_fit(39.0, 13.0), 3);
        assert_eq!(lines_that_fit(38.9, 13.0), 2);
        assert_eq!(lines_that_fit(-5.0, 13.0), 0);
        assert_eq!(split_lines(3, 3, RULES), LineSplit::All);
    }

    #[test]
    fn splits_where_lines_stop_fitting() {
        assert_eq!(split_lines(4, 10, RULES), LineSplit::Take(4));
    }

    #[test]
    fn single_orphan_line_moves_paragraph() {
        assert_eq!(split_lines(1, 5, RULES), LineSplit::NextPage);
        assert_eq!(split_lines(0, 1, RULES), LineSplit::NextPage);
    }

    #[test]
    fn widow_pulls_a_line_over() {
        // 4 of 5 fit, which would carry one line alone.
        assert_eq!(split_lines(4, 5, RULES), LineSplit::Take(3));
    }

    #[test]
    fn widow_fix_that_would_orphan_moves_everything() {
        // 2 of 3 fit; pulling one back would leave a single orphan.
        assert_eq!(split_lines(2, 3, RULES), LineSplit::NextPage);
    }

    #[test]
    fn no_minimums_takes_what_fits() {
        let loose = LineRules {
            min_orphan: 1,
            min_widow: 1,
        };
        assert_eq!(split_lines(1, 5, loose), LineSplit::Take(1));
        assert_eq!(split_lines(4, 5, loose), LineSplit::Take(4));
    }
}
