//! Hardcoded narrations: the last link of the fallback chain.

use crate::script::Narration;

pub const CALL_TO_ACTION: &str = "Follow for more .NET tips daily! 👍";

const NARRATIONS: &[(&str, &str)] = &[
    (
        "LINQ Performance Tips",
        "Did you know? Most developers write inefficient LINQ queries. Here's the secret: avoid multiple iterations. Instead of chaining Where then Select then ToList, combine them. Use deferred execution wisely. Profile your code! This simple change can reduce query time by 70%. That's the power of understanding LINQ!",
    ),
    (
        "Async Await Best Practices",
        "Async Await can be tricky. First mistake: using async void except for event handlers. Always return Task or Task<T>. Second: forgetting to await. This creates fire-and-forget bugs. Third: mixing sync and async code. Use async all the way. Never use Result or Wait on async code. These changes prevent deadlocks and make your app responsive. Master async, master .NET!",
    ),
    (
        "Dependency Injection in .NET",
        "Dependency Injection is NOT optional. It makes testing easy, code modular, and dependencies explicit. In .NET, it's built-in! Use the service collection in Startup. Register your services: AddScoped, AddSingleton, AddTransient. Understand the difference. Scoped dies with the request. Singleton lives forever. Transient is always new. Get this right, your architecture improves dramatically!",
    ),
    (
        "Entity Framework Core Optimization",
        "Entity Framework Core is powerful but slow if misused. Number one mistake: N plus one queries. Use Include to eager load. Number two: fetching too much data. Use Select to project only what you need. Number three: not using AsNoTracking when you're just reading. These three tricks can speed up your app 10x times!",
    ),
    (
        "Unit Testing with xUnit",
        "xUnit is the modern test framework for .NET. Why? It's clean, extensible, and has no static dependencies. Write Arrange Act Assert. Keep tests focused. Test one thing. Mock external dependencies with Moq. Run tests in CI CD every commit. Good tests catch bugs before production. They're insurance for your code!",
    ),
    (
        "Docker for .NET Applications",
        "Containerize your .NET app with Docker. It's not hard. Create a Dockerfile, define your base image, copy your code, expose a port, run it. Docker ensures your app runs the same everywhere. Dev, staging, production. No more it works on my machine excuses! Plus, it's container orchestration ready with Kubernetes!",
    ),
    (
        "Minimal APIs in .NET",
        "Minimal APIs are the future. No controllers, no ceremony. Just pure endpoint logic. Map Get Post Put Delete in a few lines. Less boilerplate, more clarity. Perfect for microservices and prototypes. Combine with dependency injection for power. This is modern dotnet!",
    ),
];

/// Topics with a precomposed narration, in menu order.
pub fn available_topics() -> Vec<&'static str> {
    NARRATIONS.iter().map(|(topic, _)| *topic).collect()
}

/// Case-insensitive lookup in the precomposed table.
pub fn precomposed(topic: &str) -> Option<&'static str> {
    let wanted = topic.trim().to_lowercase();
    NARRATIONS
        .iter()
        .find(|(known, _)| known.to_lowercase() == wanted)
        .map(|(_, narration)| *narration)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalGenerator;

impl LocalGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Never fails: unknown topics get a templated narration.
    pub fn generate(&self, topic: &str) -> Narration {
        match precomposed(topic) {
            Some(text) => Narration::composed(text.to_string()),
            None => Narration::composed(generic_narration(topic)),
        }
    }
}

fn generic_narration(topic: &str) -> String {
    format!(
        "Master {} today! This technique transforms your .NET skills. Learn the pattern, apply it, see results. Your code gets faster, cleaner, and more maintainable. Performance improves, bugs decrease, and your team will thank you. Let's dive in!",
        topic.trim().to_lowercase()
    )
}
