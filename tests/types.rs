// ABOUTME: Integration tests for validated domain types.
// ABOUTME: Tests parsing, validation, and display of images, tags and names.

use kubeship::types::*;
use proptest::prelude::*;

mod image_ref_tests {
    use super::*;

    #[test]
    fn parse_simple_name() {
        let img = ImageRef::parse("nginx").unwrap();
        assert_eq!(img.repository(), "nginx");
        assert_eq!(img.tag(), Some("latest"));
        assert!(img.registry().is_none());
        assert!(img.digest().is_none());
    }

    #[test]
    fn parse_docker_hub_org_is_not_a_registry() {
        let img = ImageRef::parse("library/node:20-alpine").unwrap();
        assert!(img.registry().is_none());
        assert_eq!(img.repository(), "library/node");
        assert_eq!(img.tag(), Some("20-alpine"));
    }

    #[test]
    fn parse_full_reference() {
        let img = ImageRef::parse("ghcr.io/org/repo:v1@sha256:abc123").unwrap();
        assert_eq!(img.registry(), Some("ghcr.io"));
        assert_eq!(img.repository(), "org/repo");
        assert_eq!(img.tag(), Some("v1"));
        assert_eq!(img.digest(), Some("sha256:abc123"));
    }

    #[test]
    fn parse_empty_returns_error() {
        assert!(matches!(ImageRef::parse("  "), Err(ParseImageRefError::Empty)));
    }

    #[test]
    fn parse_trailing_colon_returns_error() {
        assert!(ImageRef::parse("nginx:").is_err());
    }

    #[test]
    fn built_reference_equals_parsed_reference() {
        let tag = ImageTag::new("abc1234").unwrap();
        let built =
            ImageRef::new("123456789012.dkr.ecr.us-east-1.amazonaws.com", "my-node-app", &tag)
                .unwrap();
        let parsed = ImageRef::parse(&built.to_string()).unwrap();
        assert_eq!(built, parsed);
    }
}

mod image_tag_tests {
    use super::*;

    #[test]
    fn accepts_short_hash_and_semver() {
        assert_eq!(ImageTag::new("abc1234").unwrap().as_str(), "abc1234");
        assert_eq!(ImageTag::new("v1.2.3-rc_1").unwrap().as_str(), "v1.2.3-rc_1");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(ImageTag::new(" abc1234\n").unwrap().as_str(), "abc1234");
    }

    #[test]
    fn rejects_bad_tags() {
        assert_eq!(ImageTag::new(""), Err(ImageTagError::Empty));
        assert_eq!(ImageTag::new("-rc"), Err(ImageTagError::InvalidStart('-')));
        assert_eq!(ImageTag::new("feature/x"), Err(ImageTagError::InvalidChar('/')));
        assert_eq!(ImageTag::new(&"a".repeat(129)), Err(ImageTagError::TooLong));
    }

    proptest! {
        #[test]
        fn valid_tags_are_kept_verbatim(tag in "[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}") {
            let parsed = ImageTag::new(&tag).unwrap();
            prop_assert_eq!(parsed.as_str(), tag.as_str());
            prop_assert_eq!(parsed.to_string(), tag);
        }

        #[test]
        fn tags_with_other_characters_are_rejected(
            prefix in "[a-z0-9]{1,10}",
            bad in "[/:@ +]",
            suffix in "[a-z0-9]{0,10}",
        ) {
            let tag = format!("{prefix}{bad}{suffix}");
            prop_assert!(ImageTag::new(&tag).is_err());
        }
    }
}

mod resource_name_tests {
    use super::*;

    #[test]
    fn valid_dns_label() {
        let name = ResourceName::new("my-node-app-deployment").unwrap();
        assert_eq!(name.as_str(), "my-node-app-deployment");
    }

    #[test]
    fn empty_returns_error() {
        assert!(ResourceName::new("").is_err());
    }

    #[test]
    fn too_long_returns_error() {
        assert!(ResourceName::new(&"a".repeat(64)).is_err());
        assert!(ResourceName::new(&"a".repeat(63)).is_ok());
    }

    #[test]
    fn hyphen_at_either_end_returns_error() {
        assert!(ResourceName::new("-app").is_err());
        assert!(ResourceName::new("app-").is_err());
    }

    #[test]
    fn uppercase_returns_error() {
        assert!(ResourceName::new("MyApp").is_err());
    }
}

mod target_tests {
    use super::*;

    #[test]
    fn display_and_resource() {
        let target = DeploymentTarget::new(
            ResourceName::new("default").unwrap(),
            ResourceName::new("my-node-app-deployment").unwrap(),
            ResourceName::new("my-node-app").unwrap(),
        );
        assert_eq!(
            target.to_string(),
            "default/my-node-app-deployment[my-node-app]"
        );
        assert_eq!(target.resource(), "deployment/my-node-app-deployment");
    }
}
