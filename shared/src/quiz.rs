//! 教程与测验
//!
//! 测验流程是一个线性状态机：
//!
//! ```text
//! Loading --load--> InProgress(0) --submit--> InProgress(1) ... --submit--> Completed
//! ```
//!
//! 答案的对错只以服务端返回为准。`Mcq::correct_answer` 仅供管理员编辑题目使用，
//! 测验流程不会拿它和用户答案比较。

use crate::{Entity, Owned, Viewer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mcq {
    pub id: i64,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tutorial {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mcqs: Vec<Mcq>,
}

impl Entity for Tutorial {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Entity for Mcq {
    fn id(&self) -> i64 {
        self.id
    }
}

/// 教程只由管理员维护，没有个人所有者
impl Owned for Tutorial {
    const ADMIN_MODERATED: bool = true;

    fn is_owned_by(&self, _viewer: &Viewer) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorialRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McqRequest {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

/// 选课记录及其派生进度，(用户, 教程) 唯一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorialProgress {
    pub tutorial_id: i64,
    #[serde(default)]
    pub total_questions: u32,
    #[serde(default)]
    pub correct_answers: u32,
}

impl TutorialProgress {
    /// 得分百分比，保留两位小数；没有题目时为 0
    pub fn score(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        let raw = self.correct_answers as f64 / self.total_questions as f64 * 100.0;
        (raw * 100.0).round() / 100.0
    }
}

/// 仪表盘 "我的课程" 中的一行
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRow {
    pub tutorial_id: i64,
    pub title: String,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub score: f64,
}

pub const UNKNOWN_TUTORIAL: &str = "Unknown Tutorial";

/// 将进度与教程列表按 id 连接，补全标题与得分
pub fn join_progress(progress: &[TutorialProgress], tutorials: &[Tutorial]) -> Vec<ProgressRow> {
    progress
        .iter()
        .map(|p| ProgressRow {
            tutorial_id: p.tutorial_id,
            title: tutorials
                .iter()
                .find(|t| t.id == p.tutorial_id)
                .map(|t| t.title.clone())
                .unwrap_or_else(|| UNKNOWN_TUTORIAL.to_string()),
            correct_answers: p.correct_answers,
            total_questions: p.total_questions,
            score: p.score(),
        })
        .collect()
}

// =========================================================
// 答题协议 (Answer Protocol)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub mcq_id: i64,
    pub user_answer: String,
}

/// 服务端对一次作答的判定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResult {
    #[serde(default, alias = "isCorrect")]
    pub correct: Option<bool>,
}

/// 一道题的作答反馈
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
    /// 服务端已记录但未返回判定
    Recorded,
}

impl From<Option<&AnswerResult>> for Verdict {
    fn from(result: Option<&AnswerResult>) -> Self {
        match result.and_then(|r| r.correct) {
            Some(true) => Verdict::Correct,
            Some(false) => Verdict::Incorrect,
            None => Verdict::Recorded,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnsweredQuestion {
    pub question: String,
    pub answer: String,
    pub verdict: Verdict,
}

// =========================================================
// 状态机 (Quiz Flow)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    Loading,
    InProgress { index: usize },
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("The quiz is still loading")]
    NotReady,
    #[error("The quiz is already completed")]
    Completed,
    #[error("An answer is already being submitted")]
    SubmissionPending,
    #[error("Please select an answer")]
    EmptyAnswer,
    #[error("The selected answer is not one of the options")]
    NotAnOption,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizFlow {
    tutorial: Option<Tutorial>,
    state: QuizState,
    /// 正在提交中的答案
    pending: Option<String>,
    answers: Vec<AnsweredQuestion>,
}

impl Default for QuizFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizFlow {
    pub fn new() -> Self {
        Self {
            tutorial: None,
            state: QuizState::Loading,
            pending: None,
            answers: Vec::new(),
        }
    }

    /// 教程加载完成；没有题目的教程直接完成
    pub fn load(&mut self, tutorial: Tutorial) {
        self.state = if tutorial.mcqs.is_empty() {
            QuizState::Completed
        } else {
            QuizState::InProgress { index: 0 }
        };
        self.tutorial = Some(tutorial);
        self.pending = None;
        self.answers.clear();
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn tutorial(&self) -> Option<&Tutorial> {
        self.tutorial.as_ref()
    }

    pub fn total(&self) -> usize {
        self.tutorial.as_ref().map_or(0, |t| t.mcqs.len())
    }

    pub fn current(&self) -> Option<&Mcq> {
        match self.state {
            QuizState::InProgress { index } => self.tutorial.as_ref()?.mcqs.get(index),
            _ => None,
        }
    }

    pub fn answers(&self) -> &[AnsweredQuestion] {
        &self.answers
    }

    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    /// 开始提交答案，返回需要发送的请求
    ///
    /// 提交期间再次调用会被拒绝，直到 [`finish_submit`](Self::finish_submit)
    /// 或 [`abort_submit`](Self::abort_submit)。
    pub fn begin_submit(&mut self, answer: &str) -> Result<AnswerRequest, QuizError> {
        match self.state {
            QuizState::Loading => return Err(QuizError::NotReady),
            QuizState::Completed => return Err(QuizError::Completed),
            QuizState::InProgress { .. } => {}
        }
        if self.pending.is_some() {
            return Err(QuizError::SubmissionPending);
        }
        if answer.trim().is_empty() {
            return Err(QuizError::EmptyAnswer);
        }

        let mcq = self.current().ok_or(QuizError::NotReady)?;
        if !mcq.options.iter().any(|o| o == answer) {
            return Err(QuizError::NotAnOption);
        }
        let request = AnswerRequest {
            mcq_id: mcq.id,
            user_answer: answer.to_string(),
        };

        self.pending = Some(answer.to_string());
        Ok(request)
    }

    /// 服务端接受答案后推进到下一题或完成
    pub fn finish_submit(&mut self, result: Option<AnswerResult>) -> QuizState {
        let Some(answer) = self.pending.take() else {
            return self.state;
        };
        let QuizState::InProgress { index } = self.state else {
            return self.state;
        };

        let question = self
            .current()
            .map(|m| m.question.clone())
            .unwrap_or_default();
        self.answers.push(AnsweredQuestion {
            question,
            answer,
            verdict: Verdict::from(result.as_ref()),
        });

        self.state = if index + 1 < self.total() {
            QuizState::InProgress { index: index + 1 }
        } else {
            QuizState::Completed
        };
        self.state
    }

    /// 提交失败，停留在当前题目
    pub fn abort_submit(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcq(id: i64, question: &str) -> Mcq {
        Mcq {
            id,
            question: question.to_string(),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_answer: None,
        }
    }

    fn tutorial(mcqs: Vec<Mcq>) -> Tutorial {
        Tutorial {
            id: 7,
            title: "Rust Basics".into(),
            description: String::new(),
            mcqs,
        }
    }

    #[test]
    fn two_question_quiz_walks_to_completion() {
        let mut flow = QuizFlow::new();
        assert_eq!(flow.state(), QuizState::Loading);

        flow.load(tutorial(vec![mcq(1, "q1"), mcq(2, "q2")]));
        assert_eq!(flow.state(), QuizState::InProgress { index: 0 });

        let req = flow.begin_submit("A").unwrap();
        assert_eq!(req.mcq_id, 1);
        assert_eq!(
            flow.finish_submit(Some(AnswerResult { correct: Some(true) })),
            QuizState::InProgress { index: 1 }
        );

        let req = flow.begin_submit("C").unwrap();
        assert_eq!(req.mcq_id, 2);
        assert_eq!(flow.finish_submit(None), QuizState::Completed);

        assert_eq!(flow.begin_submit("A"), Err(QuizError::Completed));
        assert_eq!(flow.answers().len(), 2);
        assert_eq!(flow.answers()[0].verdict, Verdict::Correct);
        assert_eq!(flow.answers()[1].verdict, Verdict::Recorded);
    }

    #[test]
    fn submit_before_load_is_rejected() {
        let mut flow = QuizFlow::new();
        assert_eq!(flow.begin_submit("A"), Err(QuizError::NotReady));
    }

    #[test]
    fn empty_tutorial_completes_immediately() {
        let mut flow = QuizFlow::new();
        flow.load(tutorial(Vec::new()));
        assert_eq!(flow.state(), QuizState::Completed);
        assert!(flow.current().is_none());
    }

    #[test]
    fn second_submit_while_pending_is_rejected() {
        let mut flow = QuizFlow::new();
        flow.load(tutorial(vec![mcq(1, "q1")]));
        flow.begin_submit("B").unwrap();
        assert_eq!(flow.begin_submit("B"), Err(QuizError::SubmissionPending));
    }

    #[test]
    fn failed_submit_stays_on_question() {
        let mut flow = QuizFlow::new();
        flow.load(tutorial(vec![mcq(1, "q1"), mcq(2, "q2")]));
        flow.begin_submit("B").unwrap();
        flow.abort_submit();
        assert_eq!(flow.state(), QuizState::InProgress { index: 0 });
        assert!(flow.answers().is_empty());
        assert!(flow.begin_submit("B").is_ok());
    }

    #[test]
    fn answers_must_be_options() {
        let mut flow = QuizFlow::new();
        flow.load(tutorial(vec![mcq(1, "q1")]));
        assert_eq!(flow.begin_submit("  "), Err(QuizError::EmptyAnswer));
        assert_eq!(flow.begin_submit("E"), Err(QuizError::NotAnOption));
        assert!(!flow.is_submitting());
    }

    #[test]
    fn server_verdict_wins_even_against_stale_correct_answer() {
        let mut q = mcq(1, "q1");
        q.correct_answer = Some("A".into());
        let mut flow = QuizFlow::new();
        flow.load(tutorial(vec![q]));
        flow.begin_submit("A").unwrap();
        flow.finish_submit(Some(AnswerResult { correct: Some(false) }));
        assert_eq!(flow.answers()[0].verdict, Verdict::Incorrect);
    }

    #[test]
    fn answer_result_accepts_is_correct_alias() {
        let r: AnswerResult = serde_json::from_str(r#"{"id":3,"isCorrect":true}"#).unwrap();
        assert_eq!(r.correct, Some(true));
    }

    #[test]
    fn progress_join_fills_unknown_titles() {
        let tutorials = vec![tutorial(Vec::new())];
        let progress = vec![
            TutorialProgress {
                tutorial_id: 7,
                total_questions: 3,
                correct_answers: 2,
            },
            TutorialProgress {
                tutorial_id: 99,
                total_questions: 0,
                correct_answers: 0,
            },
        ];
        let rows = join_progress(&progress, &tutorials);
        assert_eq!(rows[0].title, "Rust Basics");
        assert_eq!(rows[0].score, 66.67);
        assert_eq!(rows[1].title, UNKNOWN_TUTORIAL);
        assert_eq!(rows[1].score, 0.0);
    }
}
