//! Per-family graders.
//!
//! Each grader is a pure function over typed inputs. Sub-parts are always
//! driven by the keys of the answer key, never by the submission, so an
//! omitted blank counts as a wrong blank and the denominator always matches
//! the number of parts the author declared.

mod completion;
mod diagram;
mod matching;
mod mcq;
mod short_answer;
mod simple;
mod tfng;

pub use completion::grade_completion;
pub use diagram::grade_diagram;
pub use matching::grade_matching;
pub use mcq::grade_mcq;
pub use short_answer::grade_short_answer;
pub use simple::grade_simple;
pub use tfng::grade_tfng;
