//! Predetermined demonstration scenarios.

use anyhow::Result;

use crate::runtime::AgentRuntime;

/// One demonstration scenario
pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    pub query: &'static str,
}

/// The demonstration set, covering different tool combinations
pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "Travel Planning",
        description: "The user is planning a trip to Paris and needs information about weather, \
                      attractions, and local tips.",
        query: "I'm planning a trip to Paris next week. What's the weather forecast, what are \
                the must-see attractions, and any local tips I should know?",
    },
    Scenario {
        name: "Academic Research",
        description: "The user is researching renewable energy and needs to find recent \
                      articles and data.",
        query: "I'm doing research on solar energy advancements. Can you find recent academic \
                articles and summarize the key findings about efficiency improvements?",
    },
    Scenario {
        name: "Complex Calculation",
        description: "The user needs to perform a complex calculation and interpret the results.",
        query: "If I invest $10,000 with an annual interest rate of 5.75% compounded monthly, \
                how much will I have after 10 years? And how much of that will be interest?",
    },
    Scenario {
        name: "Translation",
        description: "The user received a message in another language and needs help \
                      understanding and answering it.",
        query: "I received an email in French that says 'Je suis ravi de vous rencontrer la \
                semaine prochaine.' What does it mean and how should I respond politely?",
    },
    Scenario {
        name: "Project Management",
        description: "The user needs key tasks and critical-path analysis from a project \
                      schedule file.",
        query: "I have a project file called 'new_product_launch.mpp'. Can you extract the key \
                tasks, analyze the critical path, and recommend any optimization opportunities?",
    },
];

fn print_header(scenario: &Scenario) {
    println!("\n{}", "=".repeat(80));
    println!("SCENARIO: {}", scenario.name);
    println!("{}", "=".repeat(80));
    println!("\n{}\n", scenario.description);
    println!("{}\n", "-".repeat(80));
}

/// Run every demonstration scenario in sequence
pub async fn run_all(runtime: &AgentRuntime) -> Result<()> {
    for scenario in SCENARIOS {
        print_header(scenario);
        runtime.process(scenario.query).await?;
        println!("\nScenario complete!\n");
    }
    Ok(())
}
