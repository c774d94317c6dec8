// Tests for champ select session handling

#[cfg(test)]
mod test_snapshot;
