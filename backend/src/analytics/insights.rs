//! Rule-based advisory messages derived from an analytics summary.

use crate::task::Task;

use super::aggregator::{category_breakdown, CategoryCount, Summary};

/// Evaluate every insight rule in a fixed order. Rules are independent,
/// except that the low and high completion-rate messages exclude each other.
pub fn generate_insights(summary: &Summary, tasks: &[Task]) -> Vec<String> {
    let mut insights = Vec::new();
    let total = summary.total_tasks;
    if total == 0 {
        return insights;
    }

    let completed = summary.completed_tasks;
    if completed * 2 < total {
        insights.push(
            "Your task completion rate is below 50%. Consider breaking down larger tasks into smaller, more manageable pieces."
                .to_string(),
        );
    } else if completed * 5 > total * 4 {
        insights.push(
            "Great job! You're maintaining a high task completion rate. Keep up the good work!"
                .to_string(),
        );
    }

    if summary.overdue_tasks > 0 {
        insights.push(format!(
            "You have {} overdue tasks. Consider reviewing and reprioritizing them.",
            summary.overdue_tasks
        ));
    }

    if summary.due_today > 0 {
        insights.push(format!(
            "You have {} due today. Focus on completing these first.",
            summary.due_today
        ));
    }

    if let Some(top) = top_category(&category_breakdown(tasks)) {
        insights.push(format!(
            "Most of your tasks ({}) are in the \"{}\" category. Consider balancing your workload across different categories.",
            top.count, top.category
        ));
    }

    insights
}

/// Highest count wins; ties go to whichever category appears first.
pub fn top_category(counts: &[CategoryCount]) -> Option<&CategoryCount> {
    counts.iter().fold(None, |best: Option<&CategoryCount>, candidate| match best {
        Some(current) if current.count >= candidate.count => Some(current),
        _ => Some(candidate),
    })
}
