/// A canned question offered under the input box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    /// Short text shown on the button
    pub label: &'static str,
    /// Question submitted when the suggestion is chosen
    pub question: &'static str,
}

pub const SUGGESTIONS: [Suggestion; 4] = [
    Suggestion {
        label: "Binary Search",
        question: "Time complexity of Binary Search",
    },
    Suggestion {
        label: "Linked List",
        question: "Linked List vs Array trade-offs",
    },
    Suggestion {
        label: "Two Sum",
        question: "Optimal Two Sum solution",
    },
    Suggestion {
        label: "Dynamic Programming",
        question: "Dynamic Programming principles",
    },
];
