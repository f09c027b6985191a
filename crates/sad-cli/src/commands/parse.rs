use sad_client::{AuthId, PermissionMap, PermissionSet};

/// Parse one `AUTH_ID=PERMS` grant.
///
/// PERMS is either the integer value or bit names joined by `|`
/// (`VIEW|EDIT`).
pub fn parse_grant<P: PermissionSet>(raw: &str) -> anyhow::Result<(AuthId, P)> {
    let (id, perms) = raw
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("invalid grant '{raw}': expected AUTH_ID=PERMS"))?;
    let id: AuthId = id
        .trim()
        .parse()
        .map_err(|error| anyhow::anyhow!("invalid grant '{raw}': bad auth id: {error}"))?;

    let perms = perms.trim();
    if let Ok(value) = perms.parse::<u32>() {
        return Ok((id, P::from_value(value)?));
    }

    let mut bits = P::none().value();
    for name in perms.split('|').map(str::trim) {
        let flag = P::lookup(&name.to_ascii_uppercase()).ok_or_else(|| {
            anyhow::anyhow!(
                "invalid grant '{raw}': unknown {} permission '{name}'",
                P::DOMAIN
            )
        })?;
        bits |= flag.value();
    }
    Ok((id, P::from_value(bits)?))
}

/// Parse every `--grant` flag; `None` when none were given.
pub fn parse_grants<P: PermissionSet>(raw: &[String]) -> anyhow::Result<Option<PermissionMap<P>>> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.iter()
        .map(|grant| parse_grant(grant))
        .collect::<anyhow::Result<PermissionMap<P>>>()
        .map(Some)
}
