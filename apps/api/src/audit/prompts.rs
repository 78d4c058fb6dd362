// Prompt constants for contract auditing.

/// Sampling temperature for audits. Low, so excerpts stay verbatim.
pub const AUDIT_TEMPERATURE: f32 = 0.2;

/// Default audit prompt. Replace `{contract}`, `{verbatim_instruction}` and
/// `{json_instruction}` before sending. Callers may supply their own template;
/// only `{contract}` is required in it.
pub const AUDIT_PROMPT_TEMPLATE: &str = r#"You are a senior contracts lawyer reviewing the agreement below on behalf of the party who will sign it.

Identify every clause that exposes the signing party to risk. For each one return:
- "level": "high" for clauses that can cause material loss or are likely unenforceable against the other side,
  "medium" for drafting defects, ambiguity or missing protections,
  "info" for points worth knowing that need no change
- "title": a short name for the risk
- "excerpt": the exact passage from the contract the risk refers to
- "analysis": why it is a risk, in one or two sentences
- "replacement": rewritten text that can be pasted over the excerpt to fix it; empty string for "info" items

{verbatim_instruction}

Return a JSON object with this EXACT schema:
{
  "summary": "one-sentence overall assessment",
  "risks": [
    {
      "level": "high",
      "title": "Unlimited liability",
      "excerpt": "The Supplier shall be liable for all losses",
      "analysis": "No cap exposes the Supplier to losses far above the contract value.",
      "replacement": "The Supplier's aggregate liability shall not exceed the fees paid in the preceding 12 months"
    }
  ]
}

{json_instruction}

CONTRACT:
{contract}"#;
