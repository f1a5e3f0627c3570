//! Prompt templates.

use proctor_core::{CodingProblem, Difficulty, Language, TestCase};

use crate::Prompt;

const SIMULATOR_SYSTEM: &str = "\
You are a deterministic program execution engine. You never run code; you trace it \
exactly as the named language's reference implementation would, with the given stdin.
Reply with a single JSON object and nothing else:
{\"compileError\": string or null, \"runtimeError\": string or null, \"timedOut\": boolean, \
\"stdout\": string, \"stderr\": string, \"elapsedMs\": integer, \"memoryKb\": integer}
Set compileError when the source would not compile or parse. Set runtimeError when execution \
would raise or crash (for example division by zero or an index out of range). Set timedOut \
when execution would not finish within two seconds. stdout is exactly what the program prints.";

const PROBLEMS_SYSTEM: &str = "\
You write programming exercises. Every problem reads stdin and prints to stdout.
Reply with a single JSON object and nothing else:
{\"problems\": [{\"id\": string, \"title\": string, \"difficulty\": \"Easy\"|\"Medium\"|\"Hard\", \
\"description\": string, \"constraints\": [string], \
\"examples\": [{\"input\": string, \"output\": string, \"explanation\": string}], \
\"testCases\": [{\"input\": string, \"output\": string}], \
\"starterCode\": {\"python\": string, \"javascript\": string}}]}
Give each problem at least two examples and at least five hidden test cases, and make sure \
every output is correct.";

const QUIZ_SYSTEM: &str = "\
You write multiple-choice quizzes.
Reply with a single JSON object and nothing else:
{\"topic\": string, \"questions\": [{\"questionText\": string, \"options\": [string, string, \
string, string], \"correctAnswer\": string, \"explanation\": string}]}
Every question has exactly four distinct options and correctAnswer repeats one of them verbatim.";

const HINT_SYSTEM: &str = "\
You are a patient programming tutor. Explain in at most three sentences why the student's code \
fails the given case and what to look at next. Do not write the corrected code.";

pub fn simulate(language: Language, source: &str, stdin: &str) -> Prompt {
    Prompt::json(
        SIMULATOR_SYSTEM,
        format!("Language: {language}\n\nSource:\n{source}\n\nStdin:\n{stdin}"),
    )
}

pub fn problems(source_material: &str, difficulty: Difficulty) -> Prompt {
    Prompt::json(
        PROBLEMS_SYSTEM,
        format!(
            "Write {} coding problems about the following material.\n\n{source_material}",
            difficulty.as_str()
        ),
    )
}

pub fn quiz(source_material: &str, count: usize) -> Prompt {
    Prompt::json(
        QUIZ_SYSTEM,
        format!("Write {count} questions about the following material.\n\n{source_material}"),
    )
}

pub fn hint(problem: &CodingProblem, code: &str, failing_case: &TestCase) -> Prompt {
    Prompt::text(
        HINT_SYSTEM,
        format!(
            "Problem: {}\n{}\n\nStudent code:\n{code}\n\nFailing input:\n{}\nExpected output:\n{}",
            problem.title, problem.description, failing_case.input, failing_case.output
        ),
    )
}
